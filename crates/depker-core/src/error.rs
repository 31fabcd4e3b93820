//! Error taxonomy for the launcher core.
//!
//! Each stage of the pipeline has its own error type. [`LauncherError`] is
//! the umbrella the top-level handler inspects to pick an exit code.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The latest-release probe failed.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// The request could not be sent or no response arrived.
    #[error("release probe failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a client or server error.
    #[error("release probe failed, status code {0}")]
    Status(u16),

    /// The endpoint answered without redirecting to a release.
    #[error("release probe was not redirected (status code {0})")]
    NotRedirected(u16),

    /// The redirect did not carry a usable `Location`.
    #[error("release probe redirect has no version in its Location header")]
    MissingLocation,
}

/// Downloading an archive failed.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Transport failure, including a body that stopped mid-transfer.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("download of {url} failed, status code {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code returned.
        status: u16,
    },

    /// The temporary file could not be created or written.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Unpacking an archive failed.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Filesystem failure while writing entries.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The archive itself is unreadable.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// An entry would land outside the destination root.
    #[error("{}: illegal file path (entry {entry:?})", .path.display())]
    PathTraversal {
        /// Entry name as stored in the archive.
        entry: String,
        /// Destination the entry resolved to.
        path: PathBuf,
    },
}

/// A path could not be turned into a `file://` URI.
#[derive(Error, Debug)]
pub enum InvalidPathError {
    /// Only absolute paths are accepted.
    #[error("expected an absolute path, got {}", .0.display())]
    NotAbsolute(PathBuf),

    /// The path is absolute but has no URI form (e.g. a malformed UNC host).
    #[error("cannot express {} as a file URI", .0.display())]
    Unrepresentable(PathBuf),
}

/// Acquiring the runtime failed. Wraps the first failing step.
#[derive(Error, Debug)]
pub enum InstallError {
    /// The release version could not be resolved.
    #[error("Failed to resolve runtime version: {0}")]
    Resolution(#[from] ResolutionError),

    /// The archive could not be downloaded.
    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    /// The archive could not be unpacked.
    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    /// Filesystem failure around the install directory.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Neither `DEPKER_HOME` nor a user configuration directory is available.
    #[error("Could not determine the install directory. Set DEPKER_HOME to override.")]
    HomeUnavailable,

    /// The archive unpacked cleanly but did not contain the runtime.
    #[error("archive did not contain {}", .0.display())]
    MissingExecutable(PathBuf),
}

/// The child process could not be started or did not exit normally.
#[derive(Error, Debug)]
pub enum SpawnError {
    /// Spawning or waiting on the child failed.
    #[error("failed to run {}: {source}", .program.display())]
    Spawn {
        /// Program that was being started.
        program: PathBuf,
        /// Underlying OS error.
        source: io::Error,
    },

    /// The child ended without an exit code (killed by a signal).
    #[error("{} terminated abnormally{}", .program.display(), .signal.map(|s| format!(" (signal {s})")).unwrap_or_default())]
    Terminated {
        /// Program that was running.
        program: PathBuf,
        /// Terminating signal, where the platform reports one.
        signal: Option<i32>,
    },
}

impl SpawnError {
    /// Shell-style exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound => 127,
            Self::Spawn { .. } => 126,
            Self::Terminated {
                signal: Some(signal),
                ..
            } => 128 + signal,
            Self::Terminated { signal: None, .. } => 1,
        }
    }
}

/// Any failure that aborts an invocation before (or while) delegating.
#[derive(Error, Debug)]
pub enum LauncherError {
    /// Runtime acquisition failed.
    #[error(transparent)]
    Install(#[from] InstallError),

    /// The entry-script version could not be resolved.
    #[error("Failed to resolve depker version: {0}")]
    Resolution(#[from] ResolutionError),

    /// A local reference could not be converted.
    #[error(transparent)]
    InvalidPath(#[from] InvalidPathError),

    /// The delegated process failed.
    #[error(transparent)]
    Spawn(#[from] SpawnError),

    /// Filesystem failure outside the install path (glue script, purge).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl LauncherError {
    /// Process exit code reported for this failure. Always non-zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Install(_) => 2,
            Self::Spawn(err) => err.exit_code(),
            Self::Resolution(_) | Self::InvalidPath(_) | Self::Io(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_exit_codes() {
        let missing = SpawnError::Spawn {
            program: PathBuf::from("docker"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(missing.exit_code(), 127);

        let denied = SpawnError::Spawn {
            program: PathBuf::from("deno"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(denied.exit_code(), 126);

        let killed = SpawnError::Terminated {
            program: PathBuf::from("deno"),
            signal: Some(9),
        };
        assert_eq!(killed.exit_code(), 137);
    }

    #[test]
    fn test_launcher_exit_codes_are_non_zero() {
        let errors = [
            LauncherError::Install(InstallError::HomeUnavailable),
            LauncherError::Resolution(ResolutionError::MissingLocation),
            LauncherError::InvalidPath(InvalidPathError::NotAbsolute(PathBuf::from("a"))),
            LauncherError::Io(io::Error::other("boom")),
        ];
        for err in errors {
            assert_ne!(err.exit_code(), 0, "{err}");
        }
        assert_eq!(
            LauncherError::Install(InstallError::HomeUnavailable).exit_code(),
            2
        );
    }

    #[test]
    fn test_traversal_message_names_path() {
        let err = ExtractError::PathTraversal {
            entry: "../escape.txt".to_string(),
            path: PathBuf::from("/tmp/escape.txt"),
        };
        assert!(err.to_string().contains("illegal file path"));
    }
}

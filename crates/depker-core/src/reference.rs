//! Entry-script discovery and `file://` URI construction.
//!
//! A project configures depker with a script in its working directory. When
//! none exists the published `mod.ts` for the requested version is used.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::config::LauncherConfig;
use crate::error::InvalidPathError;

/// Local entry scripts, highest priority first. Relative to the working directory.
pub const CANDIDATES: [&str; 8] = [
    "depker.config.ts",
    "depker.config.js",
    ".depker/depker.config.ts",
    ".depker/depker.config.js",
    ".depker/depker.ts",
    ".depker/depker.js",
    ".depker/config.ts",
    ".depker/config.js",
];

/// Placeholder replaced by the resolved ref in the remote template.
const VERSION_PLACEHOLDER: &str = "{version}";

/// The module handed to the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeReference {
    /// A script on the local filesystem.
    Local(Url),
    /// A remote module URL, passed through untouched.
    Remote(String),
}

impl RuntimeReference {
    /// The reference as the runtime expects it on its command line.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Local(url) => url.as_str(),
            Self::Remote(url) => url,
        }
    }

    /// True for a script in the working tree.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl fmt::Display for RuntimeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks the entry script for an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceResolver {
    template: String,
}

impl ReferenceResolver {
    /// Resolver falling back to `template` (`{version}` is substituted).
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Resolver using the configured script template.
    pub fn from_config(config: &LauncherConfig) -> Self {
        Self::new(config.script_url.clone())
    }

    /// First candidate that exists as a file under `working_dir`.
    pub fn resolve_local(&self, working_dir: &Path) -> Option<PathBuf> {
        CANDIDATES
            .iter()
            .map(|candidate| working_dir.join(candidate))
            .find(|path| path.is_file())
    }

    /// Remote module for `version`.
    pub fn remote(&self, version: &str) -> RuntimeReference {
        RuntimeReference::Remote(self.template.replace(VERSION_PLACEHOLDER, version))
    }

    /// Local candidate if one exists, else the remote module.
    ///
    /// `pin` is only called when no local candidate is found, so a version
    /// probe never runs for projects with their own script.
    pub fn resolve<F, E>(&self, working_dir: &Path, pin: F) -> Result<RuntimeReference, E>
    where
        F: FnOnce() -> Result<String, E>,
        E: From<InvalidPathError>,
    {
        if let Some(path) = self.resolve_local(working_dir) {
            debug!(path = %path.display(), "using local entry script");
            return Ok(RuntimeReference::Local(to_file_uri(&path)?));
        }
        let reference = self.remote(&pin()?);
        debug!(%reference, "using remote entry script");
        Ok(reference)
    }

    /// Reference named explicitly by the user.
    ///
    /// `http(s)://` values are used as-is, `file://` values are parsed, and
    /// anything else is a path relative to `working_dir`.
    pub fn explicit(value: &str, working_dir: &Path) -> Result<RuntimeReference, InvalidPathError> {
        if value.starts_with("http://") || value.starts_with("https://") {
            return Ok(RuntimeReference::Remote(value.to_string()));
        }
        if value.starts_with("file://") {
            return Url::parse(value)
                .map(RuntimeReference::Local)
                .map_err(|_| InvalidPathError::Unrepresentable(PathBuf::from(value)));
        }
        let path = working_dir.join(value);
        Ok(RuntimeReference::Local(to_file_uri(&path)?))
    }
}

/// Convert an absolute path into a `file://` URL.
///
/// Volumes are recognised lexically, so Windows forms work on every host:
/// - `\\server\share\rest` → `file://server/share/rest`
/// - `C:\a\b` → `file:///C:/a/b`
/// - `/a/b` → `file:///a/b`
///
/// Non-UTF-8 bytes in a Unix path are percent-encoded.
pub fn to_file_uri(path: &Path) -> Result<Url, InvalidPathError> {
    let Some(raw) = path.to_str() else {
        return native_file_uri(path);
    };

    let (host, uri_path) = match split_volume(raw) {
        Some(Volume::Unc { server, rest }) => {
            if server.is_empty() {
                return Err(InvalidPathError::Unrepresentable(path.to_path_buf()));
            }
            let host = if server.eq_ignore_ascii_case("localhost") {
                ""
            } else {
                server
            };
            let rest = rest.replace('\\', "/");
            let rest = rest.trim_start_matches('/');
            (host, format!("/{}", escape_reserved(rest)))
        }
        Some(Volume::Drive(drive_path)) => {
            ("", format!("/{}", escape_reserved(drive_path).replace('\\', "/")))
        }
        Some(Volume::Root(root_path)) => ("", escape_posix(&escape_reserved(root_path))),
        None => return Err(InvalidPathError::NotAbsolute(path.to_path_buf())),
    };

    let mut url = Url::parse(&format!("file://{host}/"))
        .map_err(|_| InvalidPathError::Unrepresentable(path.to_path_buf()))?;
    url.set_path(&uri_path);
    Ok(url)
}

#[cfg(unix)]
fn native_file_uri(path: &Path) -> Result<Url, InvalidPathError> {
    if !path.is_absolute() {
        return Err(InvalidPathError::NotAbsolute(path.to_path_buf()));
    }
    Url::from_file_path(path).map_err(|()| InvalidPathError::Unrepresentable(path.to_path_buf()))
}

#[cfg(not(unix))]
fn native_file_uri(path: &Path) -> Result<Url, InvalidPathError> {
    Err(InvalidPathError::Unrepresentable(path.to_path_buf()))
}

enum Volume<'a> {
    Unc { server: &'a str, rest: &'a str },
    Drive(&'a str),
    Root(&'a str),
}

fn split_volume(raw: &str) -> Option<Volume<'_>> {
    if let Some(verbatim) = raw.strip_prefix(r"\\?\") {
        if let Some(unc) = verbatim.strip_prefix(r"UNC\") {
            return Some(unc_volume(unc));
        }
        return is_drive(verbatim).then_some(Volume::Drive(verbatim));
    }
    // `//server/share` is UNC only on Windows.
    let unc = raw
        .strip_prefix(r"\\")
        .or_else(|| raw.strip_prefix("//").filter(|_| cfg!(windows)));
    if let Some(unc) = unc {
        return Some(unc_volume(unc));
    }
    if is_drive(raw) {
        return Some(Volume::Drive(raw));
    }
    raw.starts_with('/').then_some(Volume::Root(raw))
}

fn unc_volume(unc: &str) -> Volume<'_> {
    let (server, rest) = unc
        .find(['\\', '/'])
        .map_or((unc, ""), |idx| (&unc[..idx], &unc[idx..]));
    Volume::Unc { server, rest }
}

/// `X:` followed by a separator. A bare `X:foo` is drive-relative.
fn is_drive(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'\\' | b'/')
}

// The URL parser treats `\` as a separator in file URLs. On Windows it is one.
fn escape_posix(raw: &str) -> String {
    if cfg!(windows) {
        raw.replace('\\', "/")
    } else {
        raw.replace('\\', "%5C")
    }
}

// The path setter leaves `%` alone and strips tabs and newlines.
fn escape_reserved(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '%' => out.push_str("%25"),
            '\t' => out.push_str("%09"),
            '\n' => out.push_str("%0A"),
            '\r' => out.push_str("%0D"),
            other => out.push(other),
        }
    }
    out
}

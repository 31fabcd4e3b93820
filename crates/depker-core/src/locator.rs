//! Runtime discovery and on-demand installation.
//!
//! Lookup order:
//! 1. `deno` on the caller's search path
//! 2. the managed copy under `<home>/bin`
//! 3. a fresh install of the configured release into `<home>/bin`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{Invocation, LauncherConfig};
use crate::error::InstallError;
use crate::io::ArchiveInstaller;
use crate::paths::InstallLocation;
use crate::platform::PlatformTarget;
use crate::reporter::Reporter;
use crate::version::{LatestTagSource, RedirectProbe, VersionResolver, VersionToken};

/// A runtime executable ready to be spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeLocation {
    /// Absolute path of the executable.
    pub path: PathBuf,
    /// True when the executable lives in the managed install directory.
    pub managed: bool,
}

/// Finds the runtime, installing it on a miss.
#[derive(Debug)]
pub struct RuntimeLocator<'r, S> {
    location: Option<InstallLocation>,
    target: PlatformTarget,
    version: VersionToken,
    resolver: VersionResolver<S>,
    installer: ArchiveInstaller,
    reporter: &'r dyn Reporter,
}

impl<'r> RuntimeLocator<'r, RedirectProbe> {
    /// Locator for the current platform, wired to the configured release pages.
    pub fn from_config(
        config: &LauncherConfig,
        reporter: &'r dyn Reporter,
    ) -> Result<Self, InstallError> {
        let probe = RedirectProbe::new(&config.runtime_releases)?;
        let installer = ArchiveInstaller::new(&config.runtime_releases)?;
        Ok(Self::new(
            config.home.clone().map(InstallLocation::new),
            PlatformTarget::current(),
            config.runtime_version.clone(),
            VersionResolver::new(probe),
            installer,
            reporter,
        ))
    }
}

impl<'r, S: LatestTagSource> RuntimeLocator<'r, S> {
    /// Assemble a locator from its parts.
    pub fn new(
        location: Option<InstallLocation>,
        target: PlatformTarget,
        version: VersionToken,
        resolver: VersionResolver<S>,
        installer: ArchiveInstaller,
        reporter: &'r dyn Reporter,
    ) -> Self {
        Self {
            location,
            target,
            version,
            resolver,
            installer,
            reporter,
        }
    }

    /// Return a usable runtime, installing the managed copy if nothing is found.
    pub fn locate(&self, invocation: &Invocation) -> Result<RuntimeLocation, InstallError> {
        if let Some(location) = self.find(invocation) {
            return Ok(location);
        }
        let path = self.acquire()?;
        Ok(RuntimeLocation {
            path,
            managed: true,
        })
    }

    /// Look for an existing runtime without touching the network.
    pub fn find(&self, invocation: &Invocation) -> Option<RuntimeLocation> {
        if let Some(path) = self.find_on_path(invocation) {
            debug!(path = %path.display(), "runtime found on search path");
            return Some(RuntimeLocation {
                path,
                managed: false,
            });
        }

        let managed = self.managed_path()?;
        if managed.is_file() {
            debug!(path = %managed.display(), "managed runtime found");
            return Some(RuntimeLocation {
                path: managed,
                managed: true,
            });
        }
        None
    }

    /// Remove the managed executable. Returns whether anything was deleted.
    ///
    /// A runtime found on the search path is never touched.
    pub fn purge(&self) -> io::Result<bool> {
        let Some(path) = self.managed_path() else {
            return Ok(false);
        };
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "removed managed runtime");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Path of the managed executable, if a home is known.
    pub fn managed_path(&self) -> Option<PathBuf> {
        self.location
            .as_ref()
            .map(|location| location.executable(self.target))
    }

    fn find_on_path(&self, invocation: &Invocation) -> Option<PathBuf> {
        let search_path = invocation.search_path.as_ref()?;
        which::which_in(
            self.target.runtime_name(),
            Some(search_path),
            &invocation.cwd,
        )
        .ok()
    }

    fn acquire(&self) -> Result<PathBuf, InstallError> {
        let location = self.location.as_ref().ok_or(InstallError::HomeUnavailable)?;
        let version = self.resolver.resolve_release(&self.version)?;

        self.reporter
            .section(&format!("Installing deno {version} for {}", self.target));
        let dest = location.ensure()?;
        self.installer
            .install(&version, self.target, &dest, self.reporter)?;

        let executable = location.executable(self.target);
        if !executable.is_file() {
            return Err(InstallError::MissingExecutable(executable));
        }
        make_executable(&executable)?;

        info!(path = %executable.display(), %version, "runtime installed");
        self.reporter
            .success(&format!("Installed deno {version} to {}", executable.display()));
        Ok(executable)
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    if perms.mode() & 0o111 == 0 {
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

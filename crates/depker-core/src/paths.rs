//! Install location arithmetic.

use std::io;
use std::path::PathBuf;

use dirs::config_dir;

use crate::platform::PlatformTarget;

/// Returns the launcher home (`$DEPKER_HOME`, else `<config-dir>/depker`), or
/// None if neither is available.
pub fn try_depker_home<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("DEPKER_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(val));
    }
    config_dir().map(|dir| dir.join("depker"))
}

/// Where the managed runtime lives: `<home>/bin/<executable>`.
///
/// Pure path arithmetic; nothing touches the filesystem until [`ensure`].
///
/// [`ensure`]: InstallLocation::ensure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLocation {
    home: PathBuf,
}

impl InstallLocation {
    /// Create a location rooted at `home`.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Binary installation target: `<home>/bin`
    pub fn bin_dir(&self) -> PathBuf {
        self.home.join("bin")
    }

    /// Managed runtime executable for `target`.
    pub fn executable(&self, target: PlatformTarget) -> PathBuf {
        self.bin_dir().join(target.executable_name())
    }

    /// Create the bin directory (and parents). Safe to call repeatedly.
    pub fn ensure(&self) -> io::Result<PathBuf> {
        let dir = self.bin_dir();
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

//! Launcher configuration and per-invocation inputs.
//!
//! Nothing in the core reads `std::env` directly. The front door captures
//! the environment once and hands it over through [`LauncherConfig::from_env`]
//! and [`Invocation`].

use std::ffi::OsString;
use std::path::PathBuf;

use tracing::debug;

use crate::paths::try_depker_home;
use crate::version::VersionToken;

/// Raw entry-script URL; `{version}` is replaced by the resolved ref.
pub const DEFAULT_SCRIPT_URL: &str =
    "https://raw.githubusercontent.com/syfxlin/depker/{version}/mod.ts";

/// Release page probed when the script version is `latest`.
pub const DEFAULT_RELEASES: &str = "https://github.com/syfxlin/depker/releases";

/// Release page the runtime archives are fetched from.
pub const DEFAULT_RUNTIME_RELEASES: &str = "https://github.com/denoland/deno/releases";

/// Settings that hold for the whole invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    /// Launcher home; `None` when no config directory can be determined.
    pub home: Option<PathBuf>,
    /// Entry-script version (`DEPKER_VERSION`).
    pub script_version: VersionToken,
    /// Runtime release to install on a miss (`DEPKER_DENO_VERSION`).
    pub runtime_version: VersionToken,
    /// Remote entry-script template (`DEPKER_SCRIPT_URL`).
    pub script_url: String,
    /// Release page for the entry script (`DEPKER_RELEASES`).
    pub releases: String,
    /// Release page for the runtime (`DEPKER_DENO_RELEASES`).
    pub runtime_releases: String,
    /// Explicit entry script, bypassing discovery (`--config` / `DEPKER_CONFIG`).
    pub config_override: Option<String>,
}

impl LauncherConfig {
    /// Build the configuration from an environment lookup.
    ///
    /// Empty values count as unset.
    pub fn from_env<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let config = Self {
            home: try_depker_home(&lookup),
            script_version: var("DEPKER_VERSION")
                .map(|raw| VersionToken::normalize(&raw))
                .unwrap_or_default(),
            runtime_version: var("DEPKER_DENO_VERSION")
                .map_or(VersionToken::Latest, |raw| VersionToken::normalize(&raw)),
            script_url: var("DEPKER_SCRIPT_URL").unwrap_or_else(|| DEFAULT_SCRIPT_URL.to_string()),
            releases: var("DEPKER_RELEASES").unwrap_or_else(|| DEFAULT_RELEASES.to_string()),
            runtime_releases: var("DEPKER_DENO_RELEASES")
                .unwrap_or_else(|| DEFAULT_RUNTIME_RELEASES.to_string()),
            config_override: var("DEPKER_CONFIG"),
        };
        debug!(?config, "launcher configuration");
        config
    }

    /// Override the entry script (the `--config` flag).
    pub fn with_config_override(mut self, value: Option<String>) -> Self {
        if value.is_some() {
            self.config_override = value;
        }
        self
    }
}

/// Process state captured once by the front door.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Working directory the launcher was started in.
    pub cwd: PathBuf,
    /// Executable search path (`PATH`); `None` searches nothing.
    pub search_path: Option<OsString>,
}

impl Invocation {
    /// Bundle a working directory and search path.
    pub fn new(cwd: impl Into<PathBuf>, search_path: Option<OsString>) -> Self {
        Self {
            cwd: cwd.into(),
            search_path,
        }
    }
}

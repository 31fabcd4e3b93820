//! depker-core - runtime acquisition and entry-script resolution
//!
//! The `depker` executable is a bootstrap launcher: it makes sure a Deno
//! runtime is available, decides which entry script to hand to it and then
//! gets out of the way.
//!
//! # Pipeline
//!
//! ```text
//! RuntimeLocator ──► ReferenceResolver ──► Delegator
//!   │  PATH probe          local candidates      inherited stdio
//!   │  managed install     file:// URIs          exit code passthrough
//!   └► VersionResolver + ArchiveInstaller on a cache miss
//! ```
//!
//! Everything that would otherwise be read from the process (working
//! directory, environment, search path) arrives through [`Invocation`] and
//! [`LauncherConfig`], so each stage can be exercised in isolation.
//!
//! # Directory Layout
//!
//! ```text
//! <config-dir>/depker/      # or $DEPKER_HOME
//! └── bin/
//!     └── deno              # deno.exe on Windows
//! ```

pub mod config;
pub mod delegate;
pub mod error;
pub mod io;
pub mod launcher;
pub mod locator;
pub mod paths;
pub mod platform;
pub mod reference;
pub mod reporter;
pub mod version;

#[cfg(test)]
mod test_support;

pub use config::{Invocation, LauncherConfig};
pub use error::{
    DownloadError, ExtractError, InstallError, InvalidPathError, LauncherError, ResolutionError,
    SpawnError,
};
pub use io::ArchiveInstaller;
pub use launcher::Launcher;
pub use locator::{RuntimeLocation, RuntimeLocator};
pub use paths::InstallLocation;
pub use platform::PlatformTarget;
pub use reference::{ReferenceResolver, RuntimeReference, to_file_uri};
pub use reporter::{NullReporter, Reporter};
pub use version::{LatestTagSource, RedirectProbe, VersionResolver, VersionToken};

/// User Agent string for every outgoing request.
pub const USER_AGENT: &str = concat!("depker/", env!("CARGO_PKG_VERSION"));

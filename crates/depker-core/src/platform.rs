//! Platform detection and release asset selection.
//!
//! Deno publishes one zip per target triple. The launcher only knows four of
//! them; every other `{os, arch}` pair falls back to the linux asset so the
//! mapping stays total.
//!
//! # Example
//!
//! ```
//! use depker_core::PlatformTarget;
//! use depker_core::platform::{Arch, Os};
//!
//! let target = PlatformTarget::new(Os::MacOs, Arch::Aarch64);
//! assert_eq!(target.asset_name(), "deno-aarch64-apple-darwin.zip");
//! ```

use std::fmt;
use std::str::FromStr;

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    /// Microsoft Windows
    Windows,
    /// macOS (`darwin`)
    MacOs,
    /// Linux
    Linux,
    /// Anything else; resolved through the fallback asset.
    Other,
}

/// CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// `x86_64` / `amd64`
    X86_64,
    /// `aarch64` / `arm64`
    Aarch64,
    /// Anything else; resolved through the fallback asset.
    Other,
}

/// Asset used for every pair the table does not list.
const FALLBACK_ASSET: &str = "deno-x86_64-unknown-linux-gnu.zip";

/// `(os, arch, asset)`; `None` matches any architecture. First match wins.
const ASSETS: &[(Os, Option<Arch>, &str)] = &[
    (Os::Windows, None, "deno-x86_64-pc-windows-msvc.zip"),
    (Os::MacOs, Some(Arch::X86_64), "deno-x86_64-apple-darwin.zip"),
    (Os::MacOs, Some(Arch::Aarch64), "deno-aarch64-apple-darwin.zip"),
    (Os::Linux, None, FALLBACK_ASSET),
];

impl Os {
    /// The OS this binary was compiled for.
    pub fn current() -> Self {
        std::env::consts::OS.parse().unwrap_or(Self::Other)
    }
}

impl FromStr for Os {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "windows" | "win32" => Ok(Self::Windows),
            "macos" | "darwin" | "mac" => Ok(Self::MacOs),
            "linux" => Ok(Self::Linux),
            _ => Err(format!("Unknown operating system: {s}")),
        }
    }
}

impl Arch {
    /// The architecture this binary was compiled for.
    pub fn current() -> Self {
        std::env::consts::ARCH.parse().unwrap_or(Self::Other)
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x86_64" | "amd64" => Ok(Self::X86_64),
            "aarch64" | "arm64" => Ok(Self::Aarch64),
            _ => Err(format!("Unknown architecture: {s}")),
        }
    }
}

/// The `{os, arch}` pair a runtime is acquired for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformTarget {
    /// Operating system family.
    pub os: Os,
    /// CPU architecture.
    pub arch: Arch,
}

impl PlatformTarget {
    /// Build a target from its parts.
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        Self::new(Os::current(), Arch::current())
    }

    /// Release asset (zip file name) for this target.
    pub fn asset_name(self) -> &'static str {
        ASSETS
            .iter()
            .find(|(os, arch, _)| *os == self.os && arch.is_none_or(|a| a == self.arch))
            .map_or(FALLBACK_ASSET, |(_, _, asset)| *asset)
    }

    /// Name looked up on the search path.
    pub fn runtime_name(self) -> &'static str {
        "deno"
    }

    /// File name of the runtime inside the install directory.
    pub fn executable_name(self) -> &'static str {
        match self.os {
            Os::Windows => "deno.exe",
            _ => "deno",
        }
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}-{:?}", self.os, self.arch)
    }
}

//! `depker deno ...` and `depker docker ...`

use std::ffi::OsString;

use anyhow::Result;
use depker_core::Launcher;

/// Forward `args` to the runtime.
pub fn deno(launcher: &Launcher<'_>, args: &[OsString]) -> Result<i32> {
    Ok(launcher.deno(args)?)
}

/// Forward `args` to `docker` from the search path.
pub fn docker(launcher: &Launcher<'_>, args: &[OsString]) -> Result<i32> {
    Ok(launcher.docker(args)?)
}

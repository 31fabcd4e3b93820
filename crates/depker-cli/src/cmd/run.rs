//! Default command: run the entry script.

use std::ffi::OsString;

use anyhow::Result;
use depker_core::Launcher;

/// Run the entry script with `args`, returning the child's exit code.
pub fn run(launcher: &Launcher<'_>, args: &[OsString]) -> Result<i32> {
    Ok(launcher.run(args)?)
}

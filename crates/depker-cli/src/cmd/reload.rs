//! Reload command

use anyhow::Result;
use depker_core::Launcher;

/// Re-fetch the entry script and everything it imports.
pub fn reload(launcher: &Launcher<'_>) -> Result<i32> {
    Ok(launcher.reload()?)
}

//! Update command (runtime reinstall + script reload)

use anyhow::Result;
use depker_core::{Launcher, Reporter};

/// Reinstall the managed runtime if there is one, then reload the entry script.
pub fn update(launcher: &Launcher<'_>, output: &dyn Reporter) -> Result<i32> {
    output.section("Updating depker");
    let code = launcher.update()?;
    if code == 0 {
        output.success("Entry script cache reloaded.");
    }
    Ok(code)
}

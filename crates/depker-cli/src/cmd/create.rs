//! Create command (project scaffold)

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use depker_core::{Launcher, Reporter};

/// File written into the working directory.
pub const CONFIG_FILE: &str = "depker.config.ts";

/// Starter script importing the published module at `module_url`.
pub fn template(module_url: &str) -> String {
    format!(
        "import {{ depker }} from \"{module_url}\";\n\
         \n\
         // Register services and commands on `depker` here.\n\
         \n\
         export default depker;\n"
    )
}

/// Write `depker.config.ts` into the working directory. Never overwrites.
pub fn create(launcher: &Launcher<'_>, output: &dyn Reporter) -> Result<PathBuf> {
    let path = launcher.invocation().cwd.join(CONFIG_FILE);
    if path.exists() {
        bail!("{} already exists", path.display());
    }

    let reference = launcher.remote_reference()?;
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            bail!("{} already exists", path.display())
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to create {}", path.display())),
    };
    file.write_all(template(reference.as_str()).as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    output.success(&format!("Created {}", path.display()));
    Ok(path)
}

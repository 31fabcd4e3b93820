//! Hand-off to the child process.
//!
//! The child inherits the working directory, environment and all three
//! standard streams. Its exit code becomes the launcher's exit code.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, ExitStatus};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::SpawnError;
use crate::reference::RuntimeReference;

/// Spawn `program` with `args`, wait for it and return its exit code.
pub fn run(program: &Path, args: &[OsString]) -> Result<i32, SpawnError> {
    debug!(program = %program.display(), ?args, "delegating");

    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| SpawnError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

    debug!(program = %program.display(), %status, "child exited");
    status.code().ok_or_else(|| SpawnError::Terminated {
        program: program.to_path_buf(),
        signal: signal_of(status),
    })
}

#[cfg(unix)]
fn signal_of(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: ExitStatus) -> Option<i32> {
    None
}

/// `run -q -A <glue> <user_args...>`
pub fn run_args(glue: &Path, user_args: &[OsString]) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["run".into(), "-q".into(), "-A".into(), glue.into()];
    args.extend(user_args.iter().cloned());
    args
}

/// `cache --reload <reference>`
pub fn reload_args(reference: &RuntimeReference) -> Vec<OsString> {
    vec![
        "cache".into(),
        "--reload".into(),
        reference.as_str().into(),
    ]
}

/// A throwaway module that imports the entry script and calls `execute()` on it.
///
/// The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct GlueScript {
    file: NamedTempFile,
}

impl GlueScript {
    /// Write a glue module for `reference` into the temp directory.
    pub fn write(reference: &RuntimeReference) -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("depker-")
            .suffix(".ts")
            .tempfile()?;
        file.write_all(glue_source(reference.as_str())?.as_bytes())?;
        file.flush()?;
        debug!(path = %file.path().display(), %reference, "glue script written");
        Ok(Self { file })
    }

    /// Location of the module on disk.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

fn glue_source(reference: &str) -> serde_json::Result<String> {
    Ok(format!(
        "const mod = await import({});\n\
         const depker = mod?.depker ?? mod?.default ?? mod;\n\
         await depker.execute();\n",
        js_string(reference)?
    ))
}

// A JSON string is a valid JS string literal.
fn js_string(raw: &str) -> serde_json::Result<String> {
    serde_json::to_string(raw)
}

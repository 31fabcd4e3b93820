//! Zip extraction with path-traversal protection.
//!
//! Every entry is resolved against the destination and lexically cleaned
//! before anything is written. An entry that resolves outside the root
//! aborts the whole extraction; nothing is skipped.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, trace};
use zip::ZipArchive;

use crate::error::ExtractError;

/// Mode applied to directory entries that carry no unix permissions.
const DEFAULT_DIR_MODE: u32 = 0o755;
/// Mode applied to file entries that carry no unix permissions.
const DEFAULT_FILE_MODE: u32 = 0o644;

/// Extract a zip archive into `dest_dir`, returning the entry names in
/// archive order.
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<Vec<String>, ExtractError> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    fs::create_dir_all(dest_dir)?;
    let root = lexical_clean(dest_dir);
    let mut extracted = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        let path = contained_path(&root, &name)?;
        let mode = entry.unix_mode().map(|m| m & 0o7777);

        if entry.is_dir() {
            trace!(entry = %name, "creating directory");
            create_dir_all_with_mode(&path, mode.unwrap_or(DEFAULT_DIR_MODE))?;
        } else {
            trace!(entry = %name, "writing file");
            if let Some(parent) = path.parent() {
                create_dir_all_with_mode(parent, DEFAULT_DIR_MODE)?;
            }
            let mut out = open_truncate(&path, mode.unwrap_or(DEFAULT_FILE_MODE))?;
            io::copy(&mut entry, &mut out)?;
            if let Some(mode) = mode {
                set_mode(&path, mode)?;
            }
        }

        extracted.push(name);
    }

    debug!(
        entries = extracted.len(),
        dest = %dest_dir.display(),
        "archive extracted"
    );
    Ok(extracted)
}

/// Join `name` onto `root` and refuse anything that is not strictly inside it.
fn contained_path(root: &Path, name: &str) -> Result<PathBuf, ExtractError> {
    let path = lexical_clean(&root.join(name));
    if path.starts_with(root) && path != root {
        Ok(path)
    } else {
        Err(ExtractError::PathTraversal {
            entry: name.to_string(),
            path,
        })
    }
}

/// Resolve `.` and `..` without touching the filesystem. `..` never climbs
/// above a root or prefix.
pub(crate) fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(unix)]
fn create_dir_all_with_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(mode).create(path)
}

#[cfg(not(unix))]
fn create_dir_all_with_mode(path: &Path, _mode: u32) -> io::Result<()> {
    fs::create_dir_all(path)
}

#[cfg(unix)]
fn open_truncate(path: &Path, mode: u32) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
}

#[cfg(not(unix))]
fn open_truncate(path: &Path, _mode: u32) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

// The open mode only applies on creation; re-extracting over an existing
// file must still update its permissions.
#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

//! Blocking archive download into a private temporary file.
//!
//! The whole body lands on disk before the response is dropped; the
//! unpacker never reads from the network.

use std::io::Write;

use reqwest::blocking::Client;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::DownloadError;

/// Download `url` into a fresh temporary file.
///
/// The file is removed when the returned handle is dropped, so callers keep
/// it alive exactly as long as they need the archive.
pub fn download_to_temp(client: &Client, url: &str) -> Result<NamedTempFile, DownloadError> {
    debug!(url, "downloading archive");

    let mut response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let mut file = tempfile::Builder::new()
        .prefix("depker-")
        .suffix(".zip")
        .tempfile()?;
    let written = response.copy_to(file.as_file_mut())?;
    file.as_file_mut().flush()?;

    debug!(url, bytes = written, path = %file.path().display(), "archive stored");
    Ok(file)
}

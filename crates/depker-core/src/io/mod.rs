//! IO modules - side effects (network, filesystem)

pub mod download;
pub mod extract;

use std::path::Path;

use reqwest::blocking::Client;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{DownloadError, ExtractError, InstallError};
use crate::platform::PlatformTarget;
use crate::reporter::Reporter;

/// Downloads a platform archive and unpacks it into a target directory.
#[derive(Debug, Clone)]
pub struct ArchiveInstaller {
    client: Client,
    releases: String,
}

impl ArchiveInstaller {
    /// Installer for assets published under `releases`
    /// (e.g. `https://github.com/denoland/deno/releases`).
    ///
    /// Downloads have no deadline; a slow link only makes them slower.
    pub fn new(releases: &str) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(None)
            .build()?;
        Ok(Self {
            client,
            releases: releases.trim_end_matches('/').to_string(),
        })
    }

    /// `<releases>/download/<version>/<asset>` for `target`.
    pub fn archive_url(&self, version: &str, target: PlatformTarget) -> String {
        format!(
            "{}/download/{version}/{}",
            self.releases,
            target.asset_name()
        )
    }

    /// Fetch `url` into a temporary file that is deleted on drop.
    pub fn download(&self, url: &str) -> Result<NamedTempFile, DownloadError> {
        download::download_to_temp(&self.client, url)
    }

    /// Unpack `archive` into `dest`, creating it if needed.
    pub fn extract(&self, archive: &Path, dest: &Path) -> Result<Vec<String>, ExtractError> {
        extract::extract_zip(archive, dest)
    }

    /// Download the `version` asset for `target` and unpack it into `dest`.
    pub fn install(
        &self,
        version: &str,
        target: PlatformTarget,
        dest: &Path,
        reporter: &dyn Reporter,
    ) -> Result<Vec<String>, InstallError> {
        let url = self.archive_url(version, target);
        info!(%url, %target, "installing runtime");

        reporter.downloading(&url);
        let archive = self.download(&url)?;

        reporter.extracting(dest);
        let names = self.extract(archive.path(), dest)?;
        Ok(names)
    }
}

//! Version tokens and latest-release discovery.
//!
//! Supports:
//! - Sentinels: `master` (the default) and `latest`
//! - Exact tags: `v1.2.3`, `v1.2.3-alpha4`, `v1.2.3-beta12`
//!
//! Anything else degrades to the default sentinel. The latest tag is read
//! off the `Location` header of a `releases/latest` redirect, so redirect
//! following must stay disabled on the probe client.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use tracing::{debug, warn};
use url::Url;

use crate::error::ResolutionError;

/// Sentinel used whenever a token is missing or malformed.
pub const DEFAULT_SENTINEL: &str = "master";

/// Sentinel that asks for the newest published release.
pub const LATEST_SENTINEL: &str = "latest";

fn grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        Regex::new(r"^v[0-9]+\.[0-9]+\.[0-9]+(-(alpha|beta)[0-9]+)?$")
            .expect("version grammar is a valid regex")
    })
}

/// A validated version token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VersionToken {
    /// The development branch (`master`).
    #[default]
    Master,
    /// Whatever the release endpoint currently points at.
    Latest,
    /// An exact release tag matching the version grammar.
    Tag(String),
}

impl VersionToken {
    /// Validate a raw token. Never fails: malformed input becomes [`VersionToken::Master`].
    pub fn normalize(raw: &str) -> Self {
        match raw {
            DEFAULT_SENTINEL => Self::Master,
            LATEST_SENTINEL => Self::Latest,
            _ if grammar().is_match(raw) => Self::Tag(raw.to_string()),
            "" => Self::Master,
            _ => {
                warn!(token = raw, "ignoring malformed version, using {DEFAULT_SENTINEL}");
                Self::Master
            }
        }
    }

    /// The token as text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Master => DEFAULT_SENTINEL,
            Self::Latest => LATEST_SENTINEL,
            Self::Tag(tag) => tag,
        }
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of the newest release tag.
pub trait LatestTagSource {
    /// Return the tag the "latest release" alias currently points at.
    fn resolve_latest_tag(&self) -> Result<String, ResolutionError>;
}

impl<T: LatestTagSource + ?Sized> LatestTagSource for &T {
    fn resolve_latest_tag(&self) -> Result<String, ResolutionError> {
        (**self).resolve_latest_tag()
    }
}

/// Probes `<releases>/latest` with a `HEAD` request and reads the tag from
/// the redirect target.
#[derive(Debug, Clone)]
pub struct RedirectProbe {
    client: Client,
    url: String,
}

impl RedirectProbe {
    /// Probe for a GitHub-style releases page, e.g.
    /// `https://github.com/denoland/deno/releases`.
    pub fn new(releases: &str) -> Result<Self, ResolutionError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .user_agent(crate::USER_AGENT)
            .timeout(None)
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/latest", releases.trim_end_matches('/')),
        })
    }
}

impl LatestTagSource for RedirectProbe {
    fn resolve_latest_tag(&self) -> Result<String, ResolutionError> {
        debug!(url = %self.url, "probing latest release");
        let response = self.client.head(&self.url).send()?;
        let status = response.status();

        if status.is_client_error() || status.is_server_error() {
            return Err(ResolutionError::Status(status.as_u16()));
        }
        if !status.is_redirection() {
            return Err(ResolutionError::NotRedirected(status.as_u16()));
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ResolutionError::MissingLocation)?;
        let target = response
            .url()
            .join(location)
            .map_err(|_| ResolutionError::MissingLocation)?;

        let tag = tag_from_location(&target).ok_or(ResolutionError::MissingLocation)?;
        debug!(%tag, location = %target, "latest release resolved");
        Ok(tag)
    }
}

/// Final path segment of a release redirect (`.../releases/tag/v1.2.3`).
fn tag_from_location(url: &Url) -> Option<String> {
    url.path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Turns tokens into concrete refs, consulting a [`LatestTagSource`] only
/// when the token asks for it.
#[derive(Debug, Clone)]
pub struct VersionResolver<S> {
    source: S,
}

impl<S: LatestTagSource> VersionResolver<S> {
    /// Create a resolver backed by `source`.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Tag of a published release. Both sentinels mean "latest" here, since
    /// release assets only exist for tags.
    pub fn resolve_release(&self, token: &VersionToken) -> Result<String, ResolutionError> {
        match token {
            VersionToken::Tag(tag) => Ok(tag.clone()),
            VersionToken::Master | VersionToken::Latest => self.source.resolve_latest_tag(),
        }
    }

    /// Git ref for a raw script URL. `master` is a valid ref and is kept.
    pub fn resolve_ref(&self, token: &VersionToken) -> Result<String, ResolutionError> {
        match token {
            VersionToken::Master => Ok(DEFAULT_SENTINEL.to_string()),
            VersionToken::Latest => self.source.resolve_latest_tag(),
            VersionToken::Tag(tag) => Ok(tag.clone()),
        }
    }
}

//! HTTP data source for the league-navigator JSON documents.
//!
//! Two endpoints hang off one base URL:
//!
//! * `{base}/leagues.json` — array of leagues
//! * `{base}/leagues/{slug}.json` — array of teams for one league
//!
//! Parsing is split out into [`parse_leagues`] / [`parse_teams`] so tests can
//! exercise decoding without touching the network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use super::{DataSource, League, Team};
use crate::error::ApiError;

/// Where the league-navigator documents are published.
pub const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/scoremedia/league-navigator/master/";

/// Decode a `leagues.json` body.  Any malformed record fails the whole list.
pub fn parse_leagues(body: &[u8]) -> Result<Vec<League>, ApiError> {
    Ok(serde_json::from_slice(body)?)
}

/// Decode a `leagues/{slug}.json` body.
pub fn parse_teams(body: &[u8]) -> Result<Vec<Team>, ApiError> {
    Ok(serde_json::from_slice(body)?)
}

/// A league-navigator source backed by a shared [`reqwest::Client`].
pub struct HttpSource {
    base_url: String,
    label: String,
    client: Client,
}

impl HttpSource {
    /// Create a new source rooted at `base_url`.
    ///
    /// The URL is only validated when a request is built, so a malformed base
    /// surfaces as [`ApiError::InvalidUrl`] on the first fetch.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            label: "league-navigator".into(),
            client,
        })
    }

    pub fn leagues_url(&self) -> Result<Url, ApiError> {
        self.endpoint(&["leagues.json"])
    }

    pub fn teams_url(&self, league_slug: &str) -> Result<Url, ApiError> {
        if league_slug.is_empty() {
            return Err(ApiError::InvalidUrl("empty league slug".into()));
        }
        self.endpoint(&["leagues", &format!("{league_slug}.json")])
    }

    /// Append `segments` to the base URL, percent-encoding each one so a slug
    /// can never climb out of `leagues/`.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>, ApiError> {
        debug!(source = %self.label, %url, "fetching");
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!(source = %self.label, %url, error = %e, "request failed");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(source = %self.label, %url, %status, "unexpected status");
            return Err(ApiError::InvalidResponse(format!("{url} returned {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        debug!(source = %self.label, %url, bytes = body.len(), "fetched");
        Ok(body.to_vec())
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch_leagues(&self) -> Result<Vec<League>, ApiError> {
        let body = self.get(self.leagues_url()?).await?;
        parse_leagues(&body)
    }

    async fn fetch_teams(&self, league_slug: &str) -> Result<Vec<Team>, ApiError> {
        let body = self.get(self.teams_url(league_slug)?).await?;
        parse_teams(&body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

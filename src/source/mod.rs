//! Data source abstraction layer.
//!
//! This module defines the [`DataSource`] trait together with the records it
//! produces ([`League`], [`Team`]).  The only concrete implementation is
//! [`HttpSource`], which reads the league-navigator JSON documents over HTTP.
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `fixture.rs`).
//! 2. Define a struct and implement [`DataSource`] for it.
//! 3. Add `mod fixture;` below and re-export your struct in the `pub use` block.
//! 4. Hand an `Arc` of it to [`LeagueList::new`](crate::LeagueList::new).
//!
//! Reloading, filtering and the driver are all source-agnostic.

mod http;
mod league;
mod team;

pub use http::{parse_leagues, parse_teams, HttpSource, DEFAULT_BASE_URL};
pub use league::League;
pub use team::{Rgb, Team};

use async_trait::async_trait;

use crate::error::ApiError;

/// Trait that every data source must implement.
///
/// Fetches run as tokio tasks, so implementations must be `Send + Sync`.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Human-readable label.  Lists name their fetches after it in log lines.
    fn name(&self) -> &str;

    /// Fetch the full list of leagues.
    async fn fetch_leagues(&self) -> Result<Vec<League>, ApiError>;

    /// Fetch the teams of the league identified by `league_slug`.
    ///
    /// Teams are returned in the order the source lists them.
    async fn fetch_teams(&self, league_slug: &str) -> Result<Vec<Team>, ApiError>;
}

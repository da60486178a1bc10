//! League and team list models.
//!
//! Each list pairs a [`ReloadableSource`] with a [`FilterInput`].  Once a
//! fetch is done its payload is a content object holding a
//! [`FilteredCollection`] wired to the list's filter, so the filter survives
//! reloads and the freshly loaded records are shown under it straight away.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::info;

use crate::filter::{FilterInput, FilteredCollection};
use crate::load_state::LoadState;
use crate::reload::ReloadableSource;
use crate::source::{DataSource, League, Team};

// ---------------------------------------------------------------------------
// Leagues
// ---------------------------------------------------------------------------

/// The list of every league.
pub struct LeagueList {
    content: ReloadableSource<Arc<LeagueListContent>>,
    filter: FilterInput,
}

/// What a [`LeagueList`] shows once loaded.
pub struct LeagueListContent {
    leagues: FilteredCollection<League>,
    source: Arc<dyn DataSource>,
    runtime: Handle,
    throttle: Duration,
}

impl LeagueList {
    pub fn new(runtime: Handle, source: Arc<dyn DataSource>, throttle: Duration) -> Self {
        let filter = FilterInput::spawn(&runtime, throttle);
        let filter_rx = filter.subscribe();
        let fetch_runtime = runtime.clone();
        let label = format!("{}/leagues", source.name());
        let content = ReloadableSource::new(label, runtime, move || {
            let source = Arc::clone(&source);
            let runtime = fetch_runtime.clone();
            let filter_rx = filter_rx.clone();
            async move {
                let leagues = source.fetch_leagues().await?;
                info!(source = source.name(), count = leagues.len(), "leagues loaded");
                Ok(Arc::new(LeagueListContent {
                    leagues: FilteredCollection::spawn(&runtime, leagues, filter_rx),
                    source,
                    runtime,
                    throttle,
                }))
            }
        });
        Self { content, filter }
    }

    pub fn title(&self) -> &str {
        "Leagues"
    }

    pub fn load(&self) -> bool {
        self.content.load()
    }

    pub fn reload(&self) -> bool {
        self.content.reload()
    }

    pub fn loaded(&self) -> watch::Receiver<LoadState<Arc<LeagueListContent>>> {
        self.content.subscribe()
    }

    pub fn state(&self) -> LoadState<Arc<LeagueListContent>> {
        self.content.state()
    }

    pub fn source(&self) -> &ReloadableSource<Arc<LeagueListContent>> {
        &self.content
    }

    /// Submit filter text as typed.  `None` clears it.
    pub fn filter(&self, text: Option<&str>) {
        self.filter.set(text);
    }

    pub fn active_filter(&self) -> String {
        self.filter.current()
    }
}

impl LeagueListContent {
    /// Sorted, filtered leagues.
    pub fn leagues(&self) -> watch::Receiver<Vec<League>> {
        self.leagues.subscribe()
    }

    pub fn total(&self) -> usize {
        self.leagues.total()
    }

    /// Build the team list for `league`.  Nothing is fetched until it loads.
    pub fn select(&self, league: &League) -> TeamList {
        TeamList::new(
            self.runtime.clone(),
            Arc::clone(&self.source),
            league.clone(),
            self.throttle,
        )
    }

    /// Look a league up by slug among everything that was loaded.
    pub fn find(&self, slug: &str) -> Option<League> {
        self.leagues
            .items()
            .into_iter()
            .find(|league| league.slug == slug)
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// The teams of one league.
pub struct TeamList {
    league: League,
    content: ReloadableSource<Arc<TeamListContent>>,
    filter: FilterInput,
}

/// What a [`TeamList`] shows once loaded.
pub struct TeamListContent {
    teams: FilteredCollection<Team>,
}

impl TeamList {
    pub fn new(
        runtime: Handle,
        source: Arc<dyn DataSource>,
        league: League,
        throttle: Duration,
    ) -> Self {
        let filter = FilterInput::spawn(&runtime, throttle);
        let filter_rx = filter.subscribe();
        let slug = league.slug.clone();
        let fetch_runtime = runtime.clone();
        let label = format!("{}/teams/{slug}", source.name());
        let content = ReloadableSource::new(label, runtime, move || {
            let source = Arc::clone(&source);
            let runtime = fetch_runtime.clone();
            let filter_rx = filter_rx.clone();
            let slug = slug.clone();
            async move {
                let teams = source.fetch_teams(&slug).await?;
                info!(source = source.name(), league = %slug, count = teams.len(), "teams loaded");
                Ok(Arc::new(TeamListContent {
                    teams: FilteredCollection::spawn(&runtime, teams, filter_rx),
                }))
            }
        });
        Self {
            league,
            content,
            filter,
        }
    }

    /// The league's full name.
    pub fn title(&self) -> &str {
        &self.league.full_name
    }

    pub fn league(&self) -> &League {
        &self.league
    }

    pub fn load(&self) -> bool {
        self.content.load()
    }

    pub fn reload(&self) -> bool {
        self.content.reload()
    }

    pub fn loaded(&self) -> watch::Receiver<LoadState<Arc<TeamListContent>>> {
        self.content.subscribe()
    }

    pub fn state(&self) -> LoadState<Arc<TeamListContent>> {
        self.content.state()
    }

    pub fn source(&self) -> &ReloadableSource<Arc<TeamListContent>> {
        &self.content
    }

    pub fn filter(&self, text: Option<&str>) {
        self.filter.set(text);
    }

    pub fn active_filter(&self) -> String {
        self.filter.current()
    }
}

impl TeamListContent {
    /// Filtered teams, in source order.
    pub fn teams(&self) -> watch::Receiver<Vec<Team>> {
        self.teams.subscribe()
    }

    pub fn total(&self) -> usize {
        self.teams.total()
    }
}

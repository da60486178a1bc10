//! franchise — browse leagues and teams from the terminal, one line at a time.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────────┐  watch   ┌──────────┐  println  ┌────────────┐
//! │ LeagueList / │ ───────► │  main.rs │ ────────► │ display.rs │
//! │  TeamList    │          │  (loop)  │           │  (format)  │
//! └──────────────┘          └──────────┘           └────────────┘
//!                                ▲
//!                                │ parse_line()
//!                           ┌──────────┐
//!                           │ input.rs │
//!                           └──────────┘
//! ```
//!
//! * **`input`** — maps stdin lines to commands.
//! * **`display`** — formats list state as text.
//! * **`main`** — wires everything together: parse args, build the lists,
//!   and run the event loop.

mod display;
mod input;

use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use franchise::{
    Config, DataSource, HttpSource, League, LeagueList, LeagueListContent, LoadState, Team,
    TeamList, TeamListContent,
};
use input::Command;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Mode {
    Leagues,
    Teams(String),
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Mode> {
    match (args.next().as_deref(), args.next()) {
        (None | Some("leagues"), None) => Ok(Mode::Leagues),
        (Some("teams"), Some(slug)) if args.next().is_none() => Ok(Mode::Teams(slug)),
        _ => bail!("usage: franchise [leagues | teams <slug>]"),
    }
}

// ---------------------------------------------------------------------------
// What is on screen
// ---------------------------------------------------------------------------

/// The loaded payload of a list, seen from the driver.
trait ListContent {
    type Row: Clone;

    fn rows(&self) -> watch::Receiver<Vec<Self::Row>>;
    fn total(&self) -> usize;
    fn lines(rows: &[Self::Row]) -> Vec<String>;
}

impl ListContent for LeagueListContent {
    type Row = League;

    fn rows(&self) -> watch::Receiver<Vec<League>> {
        self.leagues()
    }

    fn total(&self) -> usize {
        LeagueListContent::total(self)
    }

    fn lines(rows: &[League]) -> Vec<String> {
        display::league_lines(rows)
    }
}

impl ListContent for TeamListContent {
    type Row = Team;

    fn rows(&self) -> watch::Receiver<Vec<Team>> {
        self.teams()
    }

    fn total(&self) -> usize {
        TeamListContent::total(self)
    }

    fn lines(rows: &[Team]) -> Vec<String> {
        display::team_lines(rows)
    }
}

/// Receivers for one list: its load state, and its rows once loaded.
struct Feed<C: ListContent> {
    loaded: watch::Receiver<LoadState<Arc<C>>>,
    content: Option<(Arc<C>, watch::Receiver<Vec<C::Row>>)>,
}

impl<C: ListContent> Feed<C> {
    fn new(loaded: watch::Receiver<LoadState<Arc<C>>>) -> Self {
        Self {
            loaded,
            content: None,
        }
    }

    /// Wait for anything to change.  `false` once the list is gone.
    async fn changed(&mut self) -> bool {
        match &mut self.content {
            Some((_, rows)) => tokio::select! {
                r = self.loaded.changed() => r.is_ok(),
                r = rows.changed() => r.is_ok(),
            },
            None => self.loaded.changed().await.is_ok(),
        }
    }

    fn render(&mut self, title: &str, loaded_at: Option<DateTime<Utc>>) -> Vec<String> {
        let state = self.loaded.borrow_and_update().clone();
        match state {
            LoadState::Loading => {
                self.content = None;
                vec![display::status_loading(title)]
            }
            LoadState::Failed(err) => {
                self.content = None;
                vec![display::status_failed(title, &err)]
            }
            LoadState::Done(content) => {
                let stale = match &self.content {
                    Some((current, _)) => !Arc::ptr_eq(current, &content),
                    None => true,
                };
                if stale {
                    let rows = content.rows();
                    self.content = Some((content, rows));
                }
                let Some((content, rows)) = &mut self.content else {
                    return Vec::new();
                };
                let rows = rows.borrow_and_update().clone();
                let status = display::status_done(title, rows.len(), content.total(), loaded_at);
                let mut lines = vec![status];
                lines.extend(C::lines(&rows));
                lines
            }
        }
    }
}

enum Screen {
    Leagues(Feed<LeagueListContent>),
    Teams(TeamList, Feed<TeamListContent>),
}

impl Screen {
    fn teams(list: TeamList) -> Self {
        let feed = Feed::new(list.loaded());
        list.load();
        Screen::Teams(list, feed)
    }

    async fn changed(&mut self) -> bool {
        match self {
            Screen::Leagues(feed) => feed.changed().await,
            Screen::Teams(_, feed) => feed.changed().await,
        }
    }

    fn render(&mut self, leagues: &LeagueList) -> Vec<String> {
        match self {
            Screen::Leagues(feed) => feed.render(leagues.title(), leagues.source().loaded_at()),
            Screen::Teams(list, feed) => feed.render(list.title(), list.source().loaded_at()),
        }
    }
}

fn print(lines: &[String]) {
    println!();
    for line in lines {
        println!("{line}");
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    // -- configuration -------------------------------------------------------
    let mode = parse_args(std::env::args().skip(1))?;
    let config = Config::from_env()?;
    info!(
        base_url = %config.base_url,
        throttle_ms = config.throttle.as_millis() as u64,
        "starting"
    );

    let source: Arc<dyn DataSource> =
        Arc::new(HttpSource::new(config.base_url.clone(), config.request_timeout)?);
    let runtime = Handle::current();
    let leagues = LeagueList::new(runtime.clone(), Arc::clone(&source), config.throttle);

    let mut screen = match mode {
        Mode::Leagues => {
            let feed = Feed::new(leagues.loaded());
            leagues.load();
            Screen::Leagues(feed)
        }
        Mode::Teams(slug) => {
            let league = League::new(slug.clone(), slug);
            let list = TeamList::new(runtime.clone(), Arc::clone(&source), league, config.throttle);
            Screen::teams(list)
        }
    };

    println!("{}", display::HELP);
    print(&screen.render(&leagues));

    // -- main event loop -----------------------------------------------------
    // Each iteration waits for either:
    //   1. a state or view change on the current list, which is re-printed;
    //   2. a line on stdin, which becomes a command.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            alive = screen.changed() => {
                if !alive {
                    break;
                }
                print(&screen.render(&leagues));
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match input::parse_line(&line) {
                    Command::Filter(text) => {
                        let text = (!text.is_empty()).then_some(text.as_str());
                        match &screen {
                            Screen::Leagues(_) => leagues.filter(text),
                            Screen::Teams(list, _) => list.filter(text),
                        }
                    }
                    Command::Reload => {
                        let started = match &screen {
                            Screen::Leagues(_) => leagues.reload(),
                            Screen::Teams(list, _) => list.reload(),
                        };
                        if !started {
                            println!("already loading");
                        }
                    }
                    Command::Open(slug) => {
                        let Screen::Leagues(_) = screen else {
                            println!(":o only works on the league list");
                            continue;
                        };
                        let found = leagues.state().value().and_then(|content| {
                            let league = content.find(&slug)?;
                            Some((Arc::clone(content), league))
                        });
                        match found {
                            Some((content, league)) => {
                                screen = Screen::teams(content.select(&league));
                                print(&screen.render(&leagues));
                            }
                            None => println!("no league with slug {slug:?}"),
                        }
                    }
                    Command::Back => {
                        if let Screen::Teams(..) = screen {
                            screen = Screen::Leagues(Feed::new(leagues.loaded()));
                            // Only the first visit fetches; later visits show what is loaded.
                            if leagues.source().loaded_at().is_none() {
                                leagues.load();
                            }
                            print(&screen.render(&leagues));
                        }
                    }
                    Command::Help => println!("{}", display::HELP),
                    Command::Quit => break,
                    Command::Unknown(line) => {
                        warn!(%line, "unknown command");
                        println!("unknown command {line:?}, :h for help");
                    }
                }
            }
        }
    }

    Ok(())
}

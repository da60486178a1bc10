//! Plain-text rendering for the driver.
//!
//! Pure functions from list state to lines of text, kept apart from the event
//! loop in `main.rs` so they can be tested without a terminal.

use chrono::{DateTime, Local, Utc};

use franchise::{League, Team, UserError};

pub const HELP: &str =
    "type to filter  (empty line clears)   :r reload   :o <slug> open league   :b back   :q quit";

/// Status line for a list that finished loading.
pub fn status_done(
    title: &str,
    shown: usize,
    total: usize,
    loaded_at: Option<DateTime<Utc>>,
) -> String {
    let at = loaded_at
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".into());
    format!("[{title}] {shown}/{total} shown  (fetched {at})")
}

pub fn status_loading(title: &str) -> String {
    format!("[{title}] loading…")
}

pub fn status_failed(title: &str, error: &UserError) -> String {
    format!("[{title}] {error}  (:r to retry)")
}

pub fn league_lines(leagues: &[League]) -> Vec<String> {
    if leagues.is_empty() {
        return vec!["  (no leagues match)".into()];
    }
    leagues
        .iter()
        .map(|league| format!("  {:<32} {}", league.full_name, league.slug))
        .collect()
}

pub fn team_lines(teams: &[Team]) -> Vec<String> {
    if teams.is_empty() {
        return vec!["  (no teams match)".into()];
    }
    teams
        .iter()
        .map(|team| {
            let color = team
                .color
                .map(|c| c.to_string())
                .unwrap_or_else(|| "       ".into());
            let location = team.location.as_deref().unwrap_or("-");
            format!("  {color}  {:<32} {location}", team.full_name)
        })
        .collect()
}

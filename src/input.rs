//! Line input handling.
//!
//! Maps one line of stdin to a [`Command`].  Adding a new command is a single
//! match arm in [`parse_line`].
//!
//! ## For contributors
//!
//! To add a new command:
//!
//! 1. Add a variant to [`Command`].
//! 2. Add a match arm in [`parse_line`] that produces it.
//! 3. Handle it in the event loop in `main.rs`.
//! 4. Update the help text in [`crate::display::HELP`].

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set the filter.  An empty line clears it.
    Filter(String),
    Reload,
    /// Open the teams of the league with this slug.
    Open(String),
    Back,
    Help,
    Quit,
    /// A `:` command that was not recognised.
    Unknown(String),
}

/// Parse one input line (without its newline).
///
/// Anything not starting with `:` is filter text, kept verbatim apart from
/// the trailing line ending.
pub fn parse_line(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Filter(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("r" | "reload"), None) => Command::Reload,
        (Some("o" | "open"), Some(slug)) => Command::Open(slug.to_string()),
        (Some("b" | "back"), None) => Command::Back,
        (Some("h" | "help"), None) => Command::Help,
        (Some("q" | "quit"), None) => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

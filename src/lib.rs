//! franchise — browse sports leagues and their teams with live filtering.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  fetch   ┌──────────────────┐  watch   ┌────────────┐
//! │ source/  │ ◄─────── │ ReloadableSource │ ───────► │  observer  │
//! │  (HTTP)  │ ───────► │   LoadState<T>   │          │ (driver)   │
//! └──────────┘          └──────────────────┘          └────────────┘
//!                                │ Done                     ▲
//!                                ▼                          │ watch
//! ┌─────────────┐ active  ┌────────────────────┐            │
//! │ FilterInput │ ──────► │ FilteredCollection │ ───────────┘
//! │ (throttled) │ filter  │  arrange + match   │
//! └─────────────┘         └────────────────────┘
//! ```
//!
//! * **`source/`** — the [`DataSource`] trait, the [`League`] / [`Team`]
//!   records, and the [`HttpSource`] implementation.
//! * **`load_state`** — [`LoadState`], the loading / done / failed lifecycle.
//! * **`reload`** — [`ReloadableSource`], single-flight observable fetching.
//! * **`throttle`** — [`Throttle`], a clock-driven admission gate.
//! * **`filter`** — [`FilterInput`] and [`FilteredCollection`], the live view.
//! * **`browse`** — [`LeagueList`] / [`TeamList`], which wire all of the above.
//! * **`config`** — [`Config`], read from the environment.
//! * **`error`** — [`ApiError`] and the user-facing [`UserError`].

pub mod browse;
pub mod config;
pub mod error;
pub mod filter;
pub mod load_state;
pub mod reload;
pub mod source;
pub mod throttle;

pub use browse::{LeagueList, LeagueListContent, TeamList, TeamListContent};
pub use config::{Config, ConfigError};
pub use error::{ApiError, UserError};
pub use filter::{apply_filter, FilterInput, Filterable, FilteredCollection};
pub use load_state::LoadState;
pub use reload::ReloadableSource;
pub use source::{DataSource, HttpSource, League, Rgb, Team};
pub use throttle::{Clock, Throttle, TokioClock, DEFAULT_THROTTLE};

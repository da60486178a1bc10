//! Leagues as listed by the remote `leagues.json` index.

use serde::Deserialize;

use crate::filter::Filterable;

/// A single league.  Its `slug` names the per-league teams document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct League {
    pub full_name: String,
    pub slug: String,
}

impl League {
    pub fn new(full_name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            slug: slug.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering — sorted by full name, matched on full name or slug
// ---------------------------------------------------------------------------

impl Filterable for League {
    fn arrange(items: &mut Vec<Self>) {
        // `sort_by` is stable, so equal names keep their fetch order.
        items.sort_by(|a, b| a.full_name.cmp(&b.full_name));
    }

    fn matches(&self, needle: &str) -> bool {
        self.full_name.to_lowercase().contains(needle) || self.slug.to_lowercase().contains(needle)
    }
}

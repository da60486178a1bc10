//! Teams as listed by a league's `leagues/{slug}.json` document.
//!
//! Team records are decoded leniently: only `name` and `full_name` are
//! required.  `location`, `logo` and `colour_1` may be missing, of the wrong
//! JSON type, or malformed, and in every case the field simply becomes `None`
//! while the rest of the record (and the array) still decodes.

use std::fmt;

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::filter::Filterable;

/// A 24-bit colour parsed from an `RRGGBB` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `RRGGBB` (optionally prefixed with `#`).  Anything else is `None`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// A single team.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawTeam")]
pub struct Team {
    pub name: String,
    pub full_name: String,
    pub location: Option<String>,
    pub logo_url: Option<Url>,
    pub color: Option<Rgb>,
}

impl Team {
    pub fn new(name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            location: None,
            logo_url: None,
            color: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Wire shape of a team.  Optional fields are kept as raw JSON so a bad
/// value degrades to `None` instead of failing the whole record.
#[derive(Deserialize)]
struct RawTeam {
    name: String,
    full_name: String,
    #[serde(default)]
    location: Option<Value>,
    #[serde(default)]
    logo: Option<Value>,
    #[serde(default)]
    colour_1: Option<Value>,
}

fn as_str(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

impl From<RawTeam> for Team {
    fn from(raw: RawTeam) -> Self {
        Self {
            name: raw.name,
            full_name: raw.full_name,
            location: as_str(raw.location),
            logo_url: as_str(raw.logo).and_then(|s| Url::parse(&s).ok()),
            color: as_str(raw.colour_1).and_then(|s| Rgb::from_hex(&s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering — fetch order kept, matched on full name, name or location
// ---------------------------------------------------------------------------

impl Filterable for Team {
    fn matches(&self, needle: &str) -> bool {
        self.full_name.to_lowercase().contains(needle)
            || self.name.to_lowercase().contains(needle)
            || self
                .location
                .as_ref()
                .is_some_and(|loc| loc.to_lowercase().contains(needle))
    }
}

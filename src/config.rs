//! Runtime configuration.
//!
//! Everything has a default; environment variables override:
//!
//! | Variable | Default |
//! |---|---|
//! | `FRANCHISE_BASE_URL` | [`DEFAULT_BASE_URL`] |
//! | `FRANCHISE_THROTTLE_MS` | 500 |
//! | `FRANCHISE_TIMEOUT_SECS` | 15 |

use std::time::Duration;

use thiserror::Error;

use crate::source::DEFAULT_BASE_URL;
use crate::throttle::DEFAULT_THROTTLE;

pub const BASE_URL_VAR: &str = "FRANCHISE_BASE_URL";
pub const THROTTLE_VAR: &str = "FRANCHISE_THROTTLE_MS";
pub const TIMEOUT_VAR: &str = "FRANCHISE_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number, got {value:?}")]
    NotANumber { var: &'static str, value: String },

    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    /// Spacing applied to filter text before it reaches a list.
    pub throttle: Duration,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            throttle: DEFAULT_THROTTLE,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup.  Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(url) = get(BASE_URL_VAR) {
            config.base_url = url.trim().to_string();
        }
        if let Some(ms) = get(THROTTLE_VAR) {
            // Zero is allowed here: it turns throttling off.
            config.throttle = Duration::from_millis(parse_number(THROTTLE_VAR, &ms)?);
        }
        if let Some(secs) = get(TIMEOUT_VAR) {
            let secs = parse_number(TIMEOUT_VAR, &secs)?;
            if secs == 0 {
                return Err(ConfigError::Zero { var: TIMEOUT_VAR });
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

fn parse_number(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::NotANumber {
        var,
        value: value.to_string(),
    })
}

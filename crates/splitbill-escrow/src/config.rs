//! Ledger configuration.
//!
//! Limits that the persisted bill layout imposes. Defaults match the fixed
//! account width; override via environment variables or explicit
//! construction.

use serde::{Deserialize, Serialize};

/// Tunable limits for an [`EscrowLedger`](crate::EscrowLedger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Maximum number of entries in one bill's contributor log.
    /// Default: 10.
    pub max_contributors: usize,
    /// Whether one identity may contribute more than once to the same bill.
    /// Default: true.
    pub allow_repeat_contributors: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_contributors: 10,
            allow_repeat_contributors: true,
        }
    }
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SPLITBILL_MAX_CONTRIBUTORS` (default: 10)
    /// - `SPLITBILL_ALLOW_REPEAT_CONTRIBUTORS` (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let max_contributors = match lookup("SPLITBILL_MAX_CONTRIBUTORS") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                var: "SPLITBILL_MAX_CONTRIBUTORS",
                value: raw.clone(),
            })?,
            None => defaults.max_contributors,
        };
        let allow_repeat_contributors = match lookup("SPLITBILL_ALLOW_REPEAT_CONTRIBUTORS") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                var: "SPLITBILL_ALLOW_REPEAT_CONTRIBUTORS",
                value: raw.clone(),
            })?,
            None => defaults.allow_repeat_contributors,
        };
        let config = Self {
            max_contributors,
            allow_repeat_contributors,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations under which no bill could ever settle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_contributors == 0 {
            return Err(ConfigError::ZeroContributorLimit);
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },
    #[error("max_contributors must be at least 1")]
    ZeroContributorLimit,
}

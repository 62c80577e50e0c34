//! Ledger configuration.

use std::env;

use thiserror::Error;

use crate::Points;

/// Default upper bound for any balance.
pub const DEFAULT_MAX_BALANCE: u64 = 1_000_000;

pub const MAX_BALANCE_VAR: &str = "LEDGER_MAX_BALANCE";
pub const LOCK_VAR: &str = "LEDGER_LOCK";

/// Scope of the critical section around `apply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockGranularity {
    /// One lock for all users.
    Global,
    /// One lock per user; unrelated users never wait on each other.
    #[default]
    PerUser,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: expected a non-negative integer, got '{value}'")]
    InvalidMaxBalance { var: &'static str, value: String },

    #[error("{var}: expected 'global' or 'per-user', got '{value}'")]
    InvalidLock { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    pub max_balance: Points,
    pub granularity: LockGranularity,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_balance: Points::new(DEFAULT_MAX_BALANCE),
            granularity: LockGranularity::default(),
        }
    }
}

impl LedgerConfig {
    pub fn with_max_balance(mut self, max_balance: impl Into<Points>) -> Self {
        self.max_balance = max_balance.into();
        self
    }

    pub fn with_granularity(mut self, granularity: LockGranularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Load from `LEDGER_MAX_BALANCE` and `LEDGER_LOCK`; unset variables keep defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(MAX_BALANCE_VAR) {
            let max = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidMaxBalance {
                    var: MAX_BALANCE_VAR,
                    value: value.clone(),
                })?;
            config.max_balance = Points::new(max);
        }

        if let Some(value) = lookup(LOCK_VAR) {
            config.granularity = match value.trim().to_ascii_lowercase().as_str() {
                "global" => LockGranularity::Global,
                "per-user" | "per_user" | "user" => LockGranularity::PerUser,
                _ => {
                    return Err(ConfigError::InvalidLock {
                        var: LOCK_VAR,
                        value,
                    });
                }
            };
        }

        Ok(config)
    }
}

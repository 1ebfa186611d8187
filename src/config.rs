//! Configuration Module
//!
//! Validates cache options coming from code, JSON documents or the environment.

use std::env;

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::{ConfigError, Result};

/// Environment variable holding the capacity bound
pub const MAX_ENV_VAR: &str = "TINY_LRU_MAX";

/// Environment variable holding the TTL in milliseconds
pub const TTL_ENV_VAR: &str = "TINY_LRU_TTL";

/// Cache configuration parameters.
///
/// Both options default to zero, which disables the corresponding bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries, 0 = unbounded
    pub max: usize,
    /// Time-to-live in milliseconds for freshly written entries, 0 = no expiry
    pub ttl_ms: u64,
}

/// Options as they appear in a JSON document, before validation.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    max: Option<Value>,
    #[serde(default)]
    ttl: Option<Value>,
}

impl Config {
    // == Constructor ==
    /// Creates a configuration from already-validated values.
    pub fn new(max: usize, ttl_ms: u64) -> Self {
        Self { max, ttl_ms }
    }

    // == From JSON ==
    /// Parses a JSON document such as `{"max": 100, "ttl": 5000}`.
    ///
    /// Missing or `null` fields fall back to 0. Numeric strings are accepted;
    /// negative, fractional or non-numeric values are rejected.
    pub fn from_json(document: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(document)?;

        let max = match raw.max {
            Some(value) => option_from_value(&value)
                .and_then(|parsed| usize::try_from(parsed).ok())
                .ok_or_else(|| ConfigError::InvalidMax(value.to_string()))?,
            None => 0,
        };
        let ttl_ms = match raw.ttl {
            Some(value) => option_from_value(&value)
                .ok_or_else(|| ConfigError::InvalidTtl(value.to_string()))?,
            None => 0,
        };

        Ok(Self { max, ttl_ms })
    }

    // == From Environment ==
    /// Loads the configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `TINY_LRU_MAX` - Maximum cache entries (default: 0, unbounded)
    /// - `TINY_LRU_TTL` - TTL in milliseconds (default: 0, no expiry)
    ///
    /// A variable that is set but does not hold a non-negative integer is an
    /// error rather than a silent fallback.
    pub fn from_env() -> Result<Self> {
        let config = Self::from_lookup(|name| env::var(name).ok())?;
        info!(
            "Configuration loaded: max={}, ttl={}ms",
            config.max, config.ttl_ms
        );
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let max = match lookup(MAX_ENV_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidMax(raw.clone()))?,
            None => 0,
        };
        let ttl_ms = match lookup(TTL_ENV_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTtl(raw.clone()))?,
            None => 0,
        };

        Ok(Self { max, ttl_ms })
    }
}

/// Reads a non-negative integer from a JSON number or numeric string.
/// `null` counts as the default of 0.
fn option_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Null => Some(0),
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    }
}

//! Error types for the cache
//!
//! Construction is the only fallible step; every cache operation is total.

use thiserror::Error;

// == Config Error Enum ==
/// Raised when cache options are invalid.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `max` was negative, fractional or not a number
    #[error("Invalid max value: {0}")]
    InvalidMax(String),

    /// `ttl` was negative, fractional or not a number
    #[error("Invalid ttl value: {0}")]
    InvalidTtl(String),

    /// Fixed slot storage cannot be unbounded
    #[error("Fixed slot storage requires max > 0")]
    ZeroCapacity,

    /// Fixed slot storage could not be allocated for the requested `max`
    #[error("Cannot allocate {0} slots")]
    CapacityTooLarge(usize),

    /// Configuration document could not be parsed
    #[error("Malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for cache construction.
pub type Result<T> = std::result::Result<T, ConfigError>;

//! Payload generation error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::value::{Distribution, Value};

/// Result type for payload operations.
pub type PayloadResult<T> = Result<T, PayloadError>;

/// Errors that can occur while configuring or drawing from a payload.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The random pool cannot serve the requested number of values.
    #[error(
        "not enough values between min and max to provide data for {demand} requests (pool holds {available})"
    )]
    PoolTooSmall { demand: usize, available: u64 },

    /// A sequential part runs out before serving every request.
    #[error(
        "{distribution} part from {min} to {max} yields {available} values, fewer than the {demand} requests need"
    )]
    RangeTooSmall {
        distribution: Distribution,
        min: Value,
        max: Value,
        demand: usize,
        available: u64,
    },

    /// The random pool does not fit in memory.
    #[error("can't allocate a pool of {0} values")]
    PoolTooLarge(u64),

    /// A sequential part ran past its range.
    #[error("part exhausted after {served} values")]
    Exhausted { served: usize },

    /// Arithmetic on a value left its representable range.
    #[error("value overflow: {0}")]
    ValueOverflow(String),

    /// The part bounds are inverted.
    #[error("part min {min} is greater than max {max}")]
    InvalidRange { min: Value, max: Value },

    /// The distribution is declared but has no sampling path.
    #[error("distribution '{0}' is not implemented")]
    UnimplementedDistribution(Distribution),

    /// The payload configuration is malformed.
    #[error("invalid payload config: {0}")]
    Config(String),

    /// The payload configuration file could not be read.
    #[error("can't read the config file {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<serde_yaml::Error> for PayloadError {
    fn from(e: serde_yaml::Error) -> Self {
        PayloadError::Config(e.to_string())
    }
}

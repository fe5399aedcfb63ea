//! Payload shape configuration.
//!
//! The shape is a YAML sequence with one entry per tuple field:
//!
//! ```yaml
//! - type: uint64
//!   min: 0
//!   max: 1000000
//!   distribution: linear
//! - type: uint64
//!   distribution: incremental
//! ```
//!
//! `min` defaults to 0, `max` to `min` plus the number of values the run
//! will draw, and `distribution` to `linear`.

use std::path::Path;

use serde::Deserialize;

use crate::error::{PayloadError, PayloadResult};
use crate::value::{Distribution, Value, ValueKind};

/// Shape of one tuple field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartSpec {
    /// Kind of the generated values.
    #[serde(rename = "type")]
    pub kind: ValueKind,
    /// Lower bound.
    #[serde(default)]
    pub min: Option<u64>,
    /// Upper bound.
    #[serde(default)]
    pub max: Option<u64>,
    /// How the range is walked.
    #[serde(default)]
    pub distribution: Option<Distribution>,
}

impl PartSpec {
    /// Lower bound as a typed value.
    pub fn min_value(&self) -> Value {
        match self.kind {
            ValueKind::U64 => Value::U64(self.min.unwrap_or(0)),
        }
    }

    /// Upper bound as a typed value, defaulting to `min + demand`.
    pub fn max_value(&self, demand: usize) -> PayloadResult<Value> {
        match (self.kind, self.max) {
            (ValueKind::U64, Some(max)) => Ok(Value::U64(max)),
            (ValueKind::U64, None) => self.min_value().checked_add(demand as u64),
        }
    }

    /// Distribution, defaulting to `linear`.
    pub fn distribution(&self) -> Distribution {
        self.distribution.unwrap_or(Distribution::Linear)
    }
}

/// Parsed payload shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadConfig {
    /// Tuple fields, in order.
    pub parts: Vec<PartSpec>,
}

impl PayloadConfig {
    /// Parses a payload shape from YAML text.
    pub fn from_yaml_str(text: &str) -> PayloadResult<Self> {
        let parts: Vec<PartSpec> = serde_yaml::from_str(text)?;
        if parts.is_empty() {
            return Err(PayloadError::Config(
                "at least one part must be specified".to_string(),
            ));
        }
        Ok(Self { parts })
    }

    /// Reads and parses a payload shape file.
    pub fn from_file(path: impl AsRef<Path>) -> PayloadResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PayloadError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }
}

//! Generated key values.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

use serde::Deserialize;

use crate::error::{PayloadError, PayloadResult};

/// Kind of a generated value, as named in payload configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ValueKind {
    #[serde(rename = "uint64")]
    U64,
}

/// A single generated key value.
///
/// Arithmetic and comparison are only defined between values of the same
/// kind. Every operation matches on the pair of kinds, so a new kind has to
/// state how it combines with the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    U64(u64),
}

impl Value {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::U64(_) => ValueKind::U64,
        }
    }

    /// Advances the value by one and returns the previous value.
    pub fn post_increment(&mut self) -> PayloadResult<Value> {
        let previous = *self;
        *self = self.checked_add(1)?;
        Ok(previous)
    }

    /// Steps the value back by one and returns the previous value.
    pub fn post_decrement(&mut self) -> PayloadResult<Value> {
        let previous = *self;
        *self = match *self {
            Value::U64(v) => Value::U64(
                v.checked_sub(1)
                    .ok_or_else(|| PayloadError::ValueOverflow(format!("{v} - 1")))?,
            ),
        };
        Ok(previous)
    }

    /// Returns `self + count`.
    pub fn checked_add(self, count: u64) -> PayloadResult<Value> {
        match self {
            Value::U64(v) => v
                .checked_add(count)
                .map(Value::U64)
                .ok_or_else(|| PayloadError::ValueOverflow(format!("{v} + {count}"))),
        }
    }

    /// Number of values in `[self, end)`, or zero when `end <= self`.
    pub fn span_to(self, end: Value) -> u64 {
        match (self, end) {
            (Value::U64(start), Value::U64(end)) => end.saturating_sub(start),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::U64(a), Value::U64(b)) => Some(a.cmp(b)),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::U64(v) => write!(f, "{v}"),
        }
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::U64(value)
    }
}

/// How a part walks its value range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// From min up to max.
    Incremental,
    /// From max down to min.
    Decremental,
    /// Uniformly random, without replacement.
    Linear,
    /// Normally distributed. Declared only; rejected at construction.
    Normal,
}

impl Display for Distribution {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Distribution::Incremental => "incremental",
            Distribution::Decremental => "decremental",
            Distribution::Linear => "linear",
            Distribution::Normal => "normal",
        };
        f.write_str(name)
    }
}

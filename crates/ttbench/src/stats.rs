//! Latency statistics over a sorted sample.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;
use ttbench_wire::RequestKind;

/// Result type for statistics.
pub type StatsResult<T> = Result<T, StatsError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatsError {
    /// There is nothing to summarise.
    #[error("no latencies were collected")]
    EmptySample,

    #[error("percentile {0} is outside [0, 1]")]
    InvalidPercentile(f64),
}

/// Arithmetic mean.
pub fn average(sorted: &[u64]) -> StatsResult<f64> {
    if sorted.is_empty() {
        return Err(StatsError::EmptySample);
    }
    let sum: u128 = sorted.iter().map(|&v| u128::from(v)).sum();
    Ok(sum as f64 / sorted.len() as f64)
}

/// Middle element, or the mean of the two central elements for an even
/// sample.
pub fn median(sorted: &[u64]) -> StatsResult<f64> {
    let len = sorted.len();
    if len == 0 {
        return Err(StatsError::EmptySample);
    }
    if len % 2 == 1 {
        return Ok(sorted[len / 2] as f64);
    }
    let left = sorted[len / 2 - 1] as f64;
    let right = sorted[len / 2] as f64;
    Ok((left + right) / 2.0)
}

/// Element at index `floor((n - 1) * p)`.
pub fn percentile(sorted: &[u64], p: f64) -> StatsResult<u64> {
    if sorted.is_empty() {
        return Err(StatsError::EmptySample);
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(StatsError::InvalidPercentile(p));
    }
    let index = ((sorted.len() - 1) as f64 * p) as usize;
    Ok(sorted[index])
}

/// The figures printed at the end of a run.
///
/// Latencies are per request: each batch latency is divided by the batch
/// size. All latencies are in microseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub request: RequestKind,
    pub batch_size: usize,
    pub rps: f64,
    pub avg_us: f64,
    pub med_us: f64,
    pub min_us: f64,
    pub max_us: f64,
    pub p90_us: f64,
    pub p99_us: f64,
    pub p999_us: f64,
}

impl Summary {
    /// Summarises sorted batch latencies in nanoseconds.
    pub fn from_sorted(
        request: RequestKind,
        sorted: &[u64],
        request_count: usize,
        batch_size: usize,
    ) -> StatsResult<Self> {
        let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
            return Err(StatsError::EmptySample);
        };

        let overall_ns: u128 = sorted.iter().map(|&v| u128::from(v)).sum();
        let rps = request_count as f64 / (overall_ns as f64 / 1e9);

        let per_request_us = |ns: f64| ns / 1000.0 / batch_size as f64;

        Ok(Self {
            request,
            batch_size,
            rps,
            avg_us: per_request_us(average(sorted)?),
            med_us: per_request_us(median(sorted)?),
            min_us: per_request_us(min as f64),
            max_us: per_request_us(max as f64),
            p90_us: per_request_us(percentile(sorted, 0.9)? as f64),
            p99_us: per_request_us(percentile(sorted, 0.99)? as f64),
            p999_us: per_request_us(percentile(sorted, 0.999)? as f64),
        })
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Request: {}", self.request)?;
        writeln!(f, "Batch size: {}", self.batch_size)?;
        writeln!(f, "RPS: {:.0}", self.rps)?;
        writeln!(f, "Avg (μs): {:.3}", self.avg_us)?;
        writeln!(f, "Med (μs): {:.3}", self.med_us)?;
        writeln!(f, "Min (μs): {:.3}", self.min_us)?;
        writeln!(f, "Max (μs): {:.3}", self.max_us)?;
        writeln!(f, "90% (μs): {:.3}", self.p90_us)?;
        writeln!(f, "99% (μs): {:.3}", self.p99_us)?;
        writeln!(f, "99.9% (μs): {:.3}", self.p999_us)
    }
}

//! # ttbench: Tarantool IPROTO latency benchmark
//!
//! The library half of the `ttbench` binary: the benchmark loop, latency
//! statistics, the dump file writers, and the error report.

pub mod bench;
pub mod output;
pub mod report;
pub mod stats;

pub use bench::{BenchConfig, RunShapeError, run_benchmark};
pub use report::{render_error, report_error};
pub use stats::{StatsError, StatsResult, Summary};

#[cfg(test)]
mod tests;

//! The benchmark loop.

use std::time::Instant;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, info};
use ttbench_client::{Connection, TransferBuilder};
use ttbench_payload::Payload;
use ttbench_wire::{RequestKind, RequestParams};

/// Invalid run shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunShapeError {
    #[error("request count must be positive")]
    ZeroCount,

    #[error("batch size must be positive")]
    ZeroBatch,

    #[error(
        "request count must be divisible by the batch size. Given request count: {count}, given batch size: {batch}"
    )]
    IndivisibleBatch { count: usize, batch: usize },
}

/// What to send and how much of it.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub kind: RequestKind,
    pub params: RequestParams,
    /// Total number of requests.
    pub request_count: usize,
    /// Requests per transfer.
    pub batch_size: usize,
}

impl BenchConfig {
    /// Number of transfers the run performs.
    pub fn transfer_count(&self) -> Result<usize, RunShapeError> {
        if self.request_count == 0 {
            return Err(RunShapeError::ZeroCount);
        }
        if self.batch_size == 0 {
            return Err(RunShapeError::ZeroBatch);
        }
        if self.request_count % self.batch_size != 0 {
            return Err(RunShapeError::IndivisibleBatch {
                count: self.request_count,
                batch: self.batch_size,
            });
        }
        Ok(self.request_count / self.batch_size)
    }

    /// Number of tuples the payload must provide, counting the discovery
    /// request.
    pub fn payload_demand(&self) -> usize {
        self.request_count + 1
    }
}

/// Runs the benchmark over `conn` and returns the latency of every
/// transfer in nanoseconds, in execution order.
pub fn run_benchmark<C: Connection + ?Sized>(
    conn: &mut C,
    payload: Payload,
    config: &BenchConfig,
) -> Result<Vec<u64>> {
    let transfer_count = config.transfer_count()?;

    let mut builder = TransferBuilder::new(
        &mut *conn,
        payload,
        config.kind,
        &config.params,
        config.batch_size,
    )
    .with_context(|| format!("Couldn't discover the response size of '{}'", config.kind))?;

    info!(
        request = %config.kind,
        transfers = transfer_count,
        batch_size = config.batch_size,
        "benchmark started"
    );

    let mut latencies = Vec::with_capacity(transfer_count);
    for i in 0..transfer_count {
        let mut transfer = builder
            .next()
            .with_context(|| format!("Couldn't prepare transfer #{i}"))?;

        let started = Instant::now();
        conn.execute(&mut transfer)
            .with_context(|| format!("Couldn't perform transfer #{i}"))?;
        let latency = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
        latencies.push(latency);

        transfer
            .check()
            .with_context(|| format!("Unexpected response to transfer #{i}"))?;
        debug!(transfer = i, latency_ns = latency, "transfer complete");
    }

    info!(transfers = latencies.len(), "benchmark finished");
    Ok(latencies)
}

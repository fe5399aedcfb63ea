//! `ttbench` command line.
//!
//! Benchmarks one request kind against a Tarantool server and prints the
//! per-request latency distribution.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use ttbench::{BenchConfig, Summary, output, report_error, run_benchmark};
use ttbench_client::{ClientConfig, TcpConnection};
use ttbench_payload::{Payload, PayloadConfig, PayloadRng};
use ttbench_wire::{RequestKind, RequestParams};

/// Tarantool IPROTO latency benchmark.
#[derive(Parser, Debug)]
#[command(name = "ttbench")]
#[command(about = "Tarantool IPROTO latency benchmark", long_about = None)]
#[command(disable_help_flag = true)]
struct Cli {
    /// Request to benchmark (ping, insert, replace, delete, select).
    request: RequestKind,

    /// Requests per transfer.
    #[arg(short = 'b', long = "batch", default_value_t = 1000)]
    batch_size: usize,

    /// Total number of requests; must be a multiple of the batch size.
    #[arg(short = 'c', long = "count", default_value_t = 1_000_000)]
    request_count: usize,

    /// Server port.
    #[arg(short, long, default_value_t = 3301)]
    port: u16,

    /// Server host.
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Payload shape file (YAML).
    #[arg(short = 'i', long = "config")]
    config: Option<PathBuf>,

    /// Append raw little-endian latencies to this file.
    #[arg(short = 'o', long = "raw")]
    raw: Option<PathBuf>,

    /// Write the latency CDF to this file.
    #[arg(short = 'g', long)]
    cdf: Option<PathBuf>,

    /// Write the reversed latency CDF to this file.
    #[arg(short = 'r', long)]
    rcdf: Option<PathBuf>,

    /// Write the latency histogram to this file.
    #[arg(short = 'h', long = "hist")]
    hist: Option<PathBuf>,

    #[arg(long, default_value_t = 512)]
    space_id: u32,

    #[arg(long, default_value_t = 0)]
    index_id: u32,

    /// Select limit.
    #[arg(long, default_value_t = u32::MAX)]
    limit: u32,

    /// Select offset.
    #[arg(long, default_value_t = 0)]
    offset: u32,

    /// Select iterator type.
    #[arg(long, default_value_t = 0)]
    iterator: u32,

    /// Seed for random payload parts. Drawn from the OS when absent.
    #[arg(long)]
    seed: Option<u64>,

    /// Socket read and write timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl Cli {
    fn bench_config(&self) -> BenchConfig {
        BenchConfig {
            kind: self.request,
            params: RequestParams {
                space_id: self.space_id,
                index_id: self.index_id,
                limit: self.limit,
                offset: self.offset,
                iterator: self.iterator,
            },
            request_count: self.request_count,
            batch_size: self.batch_size,
        }
    }

    fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::default();
        match self.timeout_ms {
            Some(ms) => config.with_timeout(Duration::from_millis(ms)),
            None => config,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.bench_config();
    config.transfer_count()?;

    let payload = build_payload(cli, config.payload_demand())?;

    let mut latencies = benchmark(cli, payload, &config).context("Failed to benchmark Tarantool")?;
    latencies.sort_unstable();

    let summary = Summary::from_sorted(
        config.kind,
        &latencies,
        config.request_count,
        config.batch_size,
    )?;
    print!("{summary}");

    write_outputs(cli, &latencies)
}

fn build_payload(cli: &Cli, demand: usize) -> Result<Payload> {
    let mut payload = Payload::new(demand);
    let Some(path) = &cli.config else {
        return Ok(payload);
    };

    let mut rng = match cli.seed {
        Some(seed) => PayloadRng::new(seed),
        None => PayloadRng::from_entropy(),
    };
    let context = || format!("Failed to parse the '{}' config file", path.display());
    let shape = PayloadConfig::from_file(path).with_context(context)?;
    payload.configure(&shape, &mut rng).with_context(context)?;
    Ok(payload)
}

fn benchmark(cli: &Cli, payload: Payload, config: &BenchConfig) -> Result<Vec<u64>> {
    let mut conn = TcpConnection::connect((cli.host.as_str(), cli.port), &cli.client_config())
        .with_context(|| format!("Couldn't connect to {}:{}", cli.host, cli.port))?;
    run_benchmark(&mut conn, payload, config)
}

fn write_outputs(cli: &Cli, sorted: &[u64]) -> Result<()> {
    let outputs: [(&Option<PathBuf>, &str, fn(&Path, &[u64]) -> std::io::Result<()>); 4] = [
        (&cli.raw, "raw latencies", output::write_raw),
        (&cli.cdf, "CDF", output::write_cdf),
        (&cli.rcdf, "reversed CDF", output::write_rcdf),
        (&cli.hist, "histogram", output::write_histogram),
    ];
    for (path, what, write) in outputs {
        if let Some(path) = path {
            write(path, sorted)
                .with_context(|| format!("Couldn't write the {what} to '{}'", path.display()))?;
        }
    }
    Ok(())
}

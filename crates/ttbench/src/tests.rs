//! End-to-end tests against a stub server.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ttbench_client::{ClientConfig, ClientError, TcpConnection};
use ttbench_payload::Payload;
use ttbench_wire::{RequestKind, RequestParams, WireError};

use crate::{BenchConfig, RunShapeError, Summary, render_error, run_benchmark};

/// Serves one connection: sends a greeting, then answers every request
/// with a response whose body length is `respond(request_body_len)`.
/// Response number `corrupt` (counting the discovery request as 0) gets
/// one extra byte. Returns the full size of every request received.
fn spawn_stub(
    respond: fn(usize) -> usize,
    corrupt: Option<usize>,
) -> (SocketAddr, JoinHandle<Vec<usize>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind stub server");
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut greeting = [b' '; 128];
        greeting[..24].copy_from_slice(b"Tarantool 2.11.0 (Binary");
        stream.write_all(&greeting).unwrap();

        let mut sizes = Vec::new();
        loop {
            let mut size_field = [0u8; 5];
            if stream.read_exact(&mut size_field).is_err() {
                break;
            }
            assert_eq!(size_field[0], 0xCE);
            let len = u32::from_be_bytes(size_field[1..].try_into().unwrap()) as usize;
            let mut body = vec![0u8; len];
            if stream.read_exact(&mut body).is_err() {
                break;
            }

            let mut body_len = respond(len);
            if corrupt == Some(sizes.len()) {
                body_len += 1;
            }
            sizes.push(5 + len);

            let mut response = vec![0xCE];
            response.extend_from_slice(&(body_len as u32).to_be_bytes());
            response.resize(5 + body_len, 0x80);
            if stream.write_all(&response).is_err() {
                break;
            }
        }
        sizes
    });

    (addr, handle)
}

fn connect(addr: SocketAddr) -> TcpConnection {
    let config = ClientConfig::default().with_timeout(Duration::from_secs(5));
    TcpConnection::connect(addr, &config).unwrap()
}

fn bench_config(kind: RequestKind, request_count: usize, batch_size: usize) -> BenchConfig {
    BenchConfig {
        kind,
        params: RequestParams::default(),
        request_count,
        batch_size,
    }
}

// ============================================================================
// End-to-End Tests
// ============================================================================

#[test]
fn ping_single_request() {
    let (addr, stub) = spawn_stub(|_| 4, None);
    let mut conn = connect(addr);
    let config = bench_config(RequestKind::Ping, 1, 1);

    let latencies = run_benchmark(&mut conn, Payload::new(config.payload_demand()), &config)
        .unwrap();
    assert_eq!(latencies.len(), 1);
    drop(conn);

    // Discovery plus the measured request, both bare 11-byte pings.
    assert_eq!(stub.join().unwrap(), [11, 11]);
}

#[test]
fn insert_batches() {
    let (addr, stub) = spawn_stub(|len| len + 20, None);
    let mut conn = connect(addr);
    let config = bench_config(RequestKind::Insert, 40, 10);

    let mut latencies =
        run_benchmark(&mut conn, Payload::new(config.payload_demand()), &config).unwrap();
    assert_eq!(latencies.len(), 4);
    drop(conn);

    let sizes = stub.join().unwrap();
    assert_eq!(sizes.len(), 41);
    // Tuples [0] through [40] all fit in a positive fixint.
    assert!(sizes.iter().all(|&size| size == 18));

    latencies.sort_unstable();
    let summary = Summary::from_sorted(RequestKind::Insert, &latencies, 40, 10).unwrap();
    assert!(summary.min_us <= summary.max_us);
    assert!(summary.rps > 0.0);
}

#[test]
fn select_with_growing_keys() {
    // Key 128 is the first to need the uint8 encoding.
    let (addr, stub) = spawn_stub(|len| len + 7, None);
    let mut conn = connect(addr);
    let config = bench_config(RequestKind::Select, 200, 20);

    let latencies =
        run_benchmark(&mut conn, Payload::new(config.payload_demand()), &config).unwrap();
    assert_eq!(latencies.len(), 10);
    drop(conn);

    let sizes = stub.join().unwrap();
    assert_eq!(sizes.len(), 201);
    assert_eq!(sizes[127] + 1, sizes[128]);
}

#[test]
fn response_size_mismatch_aborts_the_run() {
    let (addr, _stub) = spawn_stub(|len| len + 20, Some(5));
    let mut conn = connect(addr);
    let config = bench_config(RequestKind::Replace, 20, 10);

    let err = run_benchmark(&mut conn, Payload::new(config.payload_demand()), &config)
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ClientError>(),
        Some(ClientError::Wire(WireError::ResponseSizeMismatch {
            index: 4,
            expected: 38,
            actual: 39
        }))
    ));
    assert_eq!(
        render_error(&err),
        "Unexpected response to transfer #0:\n  response #4 size mismatch: expected 38 bytes, got 39.\n"
    );
}

#[test]
fn server_closing_mid_discovery_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let stub = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.write_all(&[b' '; 128]).unwrap();
        let mut request = [0u8; 11];
        stream.read_exact(&mut request).unwrap();
    });

    let mut conn = connect(addr);
    let config = bench_config(RequestKind::Ping, 1, 1);
    let err = run_benchmark(&mut conn, Payload::new(2), &config).unwrap_err();
    stub.join().unwrap();

    let report = render_error(&err);
    assert!(
        report.starts_with("Couldn't discover the response size of 'ping':\n"),
        "{report}"
    );
    assert!(matches!(
        err.downcast_ref::<ClientError>(),
        Some(ClientError::ConnectionClosed { received: 0, expected: 5 })
    ));
}

#[test]
fn missing_greeting_fails_connect() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let stub = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.write_all(b"Tarantool").unwrap();
    });

    let result = TcpConnection::connect(addr, &ClientConfig::default());
    stub.join().unwrap();
    assert!(matches!(
        result,
        Err(ClientError::ConnectionClosed {
            received: 9,
            expected: 128
        })
    ));
}

#[test]
fn greeting_and_nodelay_can_be_disabled() {
    // A server that never greets: the first bytes it sends are a response.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let stub = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut requests = 0;
        let mut ping = [0u8; 11];
        while stream.read_exact(&mut ping).is_ok() {
            stream
                .write_all(&[0xCE, 0x00, 0x00, 0x00, 0x04, 0x81, 0x00, 0x00, 0x80])
                .unwrap();
            requests += 1;
        }
        requests
    });

    let config = ClientConfig::default()
        .with_greeting(false)
        .with_nodelay(false)
        .with_timeout(Duration::from_secs(5));
    let mut conn = TcpConnection::connect(addr, &config).unwrap();
    let bench = bench_config(RequestKind::Ping, 2, 1);

    let latencies = run_benchmark(&mut conn, Payload::new(3), &bench).unwrap();
    assert_eq!(latencies.len(), 2);
    drop(conn);
    assert_eq!(stub.join().unwrap(), 3);
}

// ============================================================================
// Run Shape Tests
// ============================================================================

#[test]
fn transfer_count_requires_divisible_batch() {
    assert_eq!(bench_config(RequestKind::Ping, 100, 10).transfer_count(), Ok(10));
    assert_eq!(
        bench_config(RequestKind::Ping, 100, 30).transfer_count(),
        Err(RunShapeError::IndivisibleBatch {
            count: 100,
            batch: 30
        })
    );
    assert_eq!(
        bench_config(RequestKind::Ping, 100, 0).transfer_count(),
        Err(RunShapeError::ZeroBatch)
    );
}

/// A connection that must never be used.
struct Unreachable;

impl ttbench_client::Connection for Unreachable {
    fn send(&mut self, _: &[u8]) -> ttbench_client::ClientResult<usize> {
        panic!("nothing should be sent");
    }
    fn recv_exact(&mut self, _: &mut [u8]) -> ttbench_client::ClientResult<()> {
        panic!("nothing should be read");
    }
}

#[test]
fn indivisible_batch_fails_before_sending() {
    let config = bench_config(RequestKind::Insert, 7, 2);
    let err = run_benchmark(&mut Unreachable, Payload::new(8), &config).unwrap_err();
    assert!(err.to_string().contains("divisible"), "{err}");
}

#[test]
fn zero_request_count_fails_before_sending() {
    let config = bench_config(RequestKind::Ping, 0, 1);
    assert_eq!(config.transfer_count(), Err(RunShapeError::ZeroCount));

    let err = run_benchmark(&mut Unreachable, Payload::new(1), &config).unwrap_err();
    assert_eq!(
        err.downcast_ref::<RunShapeError>(),
        Some(&RunShapeError::ZeroCount)
    );
}

#[test]
fn payload_demand_counts_discovery() {
    assert_eq!(bench_config(RequestKind::Insert, 1000, 100).payload_demand(), 1001);
}

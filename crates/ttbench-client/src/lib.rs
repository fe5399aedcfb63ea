//! # ttbench-client: Batched IPROTO transfers for `ttbench`
//!
//! This crate drives request batches against a Tarantool server over a
//! blocking connection, using the framing defined in `ttbench-wire` and the
//! tuples generated by `ttbench-payload`.
//!
//! ## Usage
//!
//! ```ignore
//! use ttbench_client::{ClientConfig, Connection, TcpConnection, TransferBuilder};
//! use ttbench_payload::Payload;
//! use ttbench_wire::{RequestKind, RequestParams};
//!
//! let mut conn = TcpConnection::connect("localhost:3301", &ClientConfig::default())?;
//! let mut builder = TransferBuilder::new(
//!     &mut conn,
//!     Payload::new(1001),
//!     RequestKind::Insert,
//!     &RequestParams::default(),
//!     100,
//! )?;
//!
//! for _ in 0..10 {
//!     let mut transfer = builder.next()?;
//!     conn.execute(&mut transfer)?;
//!     transfer.check()?;
//! }
//! ```

mod connection;
mod error;
mod transfer;
mod tuple;

pub use connection::{ClientConfig, Connection, GREETING_SIZE, TcpConnection};
pub use error::{ClientError, ClientResult};
pub use transfer::{Transfer, TransferBuilder};
pub use tuple::TupleEncoder;

pub use ttbench_wire::{RequestKind, RequestParams};

//! # ttbench-wire: IPROTO framing for `ttbench`
//!
//! This crate encodes the requests `ttbench` sends to a Tarantool server and
//! validates the framing of the responses it reads back.
//!
//! ## Frame Format
//!
//! ```text
//! ┌──────┬──────────────┬─────────────────┬────────────────────────┐
//! │ 0xCE │ Size (4 B)   │ Header map      │ Body map               │
//! │ (1B) │ header+body  │ {type, sync}    │ {space, ..., key/tuple}│
//! └──────┴──────────────┴─────────────────┴────────────────────────┘
//! ```
//!
//! - **Size**: big-endian u32 length of header and body, always encoded as
//!   a MessagePack uint32 so it can be patched in place
//! - **Header**: request type and a zero sync number
//! - **Body**: per-kind numeric fields followed by the key or tuple
//!
//! Requests are built from a per-kind template (see [`encode_template`]);
//! the trailing tuple is appended by the caller, which then patches the size
//! field with [`patch_size_field`].

pub mod codec;
mod error;
mod frame;
mod request;
mod response;

pub use error::{WireError, WireResult};
pub use frame::FrameBuilder;
pub use request::{
    RequestKind, RequestParams, encode_template, patch_size_field, template_size,
};
pub use response::{hex_dump, validate_responses};

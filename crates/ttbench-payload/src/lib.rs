//! # ttbench-payload: Request contents for `ttbench`
//!
//! Each benchmark request carries one generated tuple (or key). A
//! [`Payload`] is an ordered list of [`Part`]s, one per tuple field; every
//! part walks its own value range according to a [`Distribution`]:
//!
//! - **incremental**: `min`, `min + 1`, ... up to but excluding `max`
//! - **decremental**: `max`, `max - 1`, ... down to and including `min`
//! - **linear**: `[min, max)` shuffled once, served without repetition
//!
//! Random parts are shuffled with a caller-owned [`PayloadRng`], so a run is
//! reproducible from its seed.

mod config;
mod error;
mod part;
mod payload;
mod rng;
mod value;

pub use config::{PartSpec, PayloadConfig};
pub use error::{PayloadError, PayloadResult};
pub use part::Part;
pub use payload::Payload;
pub use rng::PayloadRng;
pub use value::{Distribution, Value, ValueKind};

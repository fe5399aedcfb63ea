//! MessagePack encoding of generated tuples.

use ttbench_payload::{Payload, Value};
use ttbench_wire::WireError;
use ttbench_wire::codec;

use crate::error::ClientResult;

/// Draws tuples from a payload and appends them as MessagePack arrays.
///
/// The value scratch buffer is reused across calls.
#[derive(Debug, Default)]
pub struct TupleEncoder {
    values: Vec<Value>,
}

impl TupleEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the next tuple from `payload` to `out`, returning its encoded
    /// length.
    pub fn encode_next(&mut self, payload: &mut Payload, out: &mut Vec<u8>) -> ClientResult<usize> {
        self.values.clear();
        payload.next(&mut self.values)?;

        let arity = u32::try_from(self.values.len())
            .map_err(|_| WireError::TupleTooLong(self.values.len()))?;

        let start = out.len();
        codec::encode_array(out, arity);
        for value in &self.values {
            encode_value(out, value);
        }
        Ok(out.len() - start)
    }
}

fn encode_value(out: &mut Vec<u8>, value: &Value) {
    match *value {
        Value::U64(v) => codec::encode_uint(out, v),
    }
}

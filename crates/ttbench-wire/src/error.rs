//! Wire protocol error types.

use thiserror::Error;

/// Result type for wire protocol operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors that can occur while encoding requests or validating responses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    /// A frame builder ran out of its pre-computed capacity.
    #[error("{0}")]
    Overflow(String),

    /// The request kind name is not one of the supported kinds.
    #[error("unknown request name: '{0}'")]
    UnknownRequest(String),

    /// The encoded frame cannot be described by a 32-bit size field.
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: u32 },

    /// Patching the header+body size field would overflow it.
    #[error("header and body size overflow: {size} + {added} does not fit in 32 bits")]
    SizeFieldOverflow { size: u32, added: usize },

    /// A tuple has more fields than a MessagePack array can describe.
    #[error("tuple arity {0} does not fit in a MessagePack array header")]
    TupleTooLong(usize),

    /// The response does not start with a 4-byte MessagePack size.
    #[error(
        "response #{index}: expected 4-byte MsgPack as the response size, got marker 0x{marker:02x}"
    )]
    UnexpectedSizeMarker { index: usize, marker: u8 },

    /// The declared response size differs from the expected one.
    #[error("response #{index} size mismatch: expected {expected} bytes, got {actual}")]
    ResponseSizeMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// Not enough bytes left in the response buffer.
    #[error("truncated response #{index}: need {needed} bytes, have {available}")]
    Truncated {
        index: usize,
        needed: usize,
        available: usize,
    },
}

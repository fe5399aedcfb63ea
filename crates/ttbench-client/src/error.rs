//! Client error types.

use thiserror::Error;
use ttbench_payload::PayloadError;
use ttbench_wire::WireError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while driving transfers over a connection.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection error.
    #[error("connection error")]
    Connection(#[from] std::io::Error),

    /// Wire protocol error.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// Payload generation error.
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// The server closed the connection mid-read.
    #[error("server closed connection after {received} of {expected} bytes")]
    ConnectionClosed { received: usize, expected: usize },

    /// Fewer bytes were sent than the batch holds.
    #[error("can't send the request batch: sent {sent} of {expected} bytes")]
    ShortWrite { sent: usize, expected: usize },

    /// The discovery response did not start with a 4-byte MessagePack size.
    #[error(
        "unexpected size of IPROTO request size specifier in response: expected 0xce, got 0x{0:02x}"
    )]
    UnexpectedSizeMarker(u8),

    /// The discovery response is smaller than the tuple that was sent.
    #[error("response of {response} bytes is smaller than the {tuple}-byte tuple sent")]
    ResponseTooSmall { response: usize, tuple: usize },

    /// A transfer must hold at least one request.
    #[error("request count per transfer must be positive")]
    EmptyTransfer,
}

//! Error types for danikor-client.

use thiserror::Error;

/// Main error type for all driver operations.
#[derive(Debug, Error)]
pub enum DriverError {
    /// I/O error on an established socket. Treated as connection
    /// termination by the receive loop; the caller must re-dial.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Buffer is shorter than the minimum decodable frame.
    #[error("frame too short: need at least {needed} bytes, got {got}")]
    FrameTooShort { needed: usize, got: usize },

    /// Sentinel bytes or the declared length field don't match the wire.
    #[error("invalid framing: {0}")]
    InvalidFraming(String),

    /// Protocol violation (e.g. declared payload exceeds the configured maximum).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Program set number outside the device's valid range of 1-8.
    #[error("pset number not supported: {0} (valid range 1-8)")]
    PsetOutOfRange(u8),

    /// A read exceeded the configured deadline.
    #[error("read timed out")]
    ReadTimeout,

    /// Peer closed the connection.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Result type alias using DriverError.
pub type Result<T> = std::result::Result<T, DriverError>;

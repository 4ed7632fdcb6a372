//! Frame buffer for accumulating partial reads.
//!
//! TCP gives no guarantee that one read returns one frame: device messages
//! may be split or coalesced across reads. This buffer accumulates raw
//! bytes in a `bytes::BytesMut` and extracts complete frames using the
//! declared length field, via a small state machine:
//! - `WaitingForPrefix`: need the STX + 4-byte length field
//! - `WaitingForBody`: prefix parsed, waiting for body + trailer
//!
//! # Example
//!
//! ```
//! use danikor_client::protocol::{encode_command, FrameBuffer};
//!
//! let mut buffer = FrameBuffer::new();
//! let wire = encode_command(b"R0001");
//!
//! // Bytes arrive in arbitrary chunks from the socket.
//! assert!(buffer.push(&wire[..4]).unwrap().is_empty());
//! let frames = buffer.push(&wire[4..]).unwrap();
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].message_id(), "0001");
//! ```

use bytes::BytesMut;

use super::wire_format::{
    decode_frame, declared_length, BODY_MIN, DEFAULT_MAX_PAYLOAD_SIZE, PREFIX_SIZE, STX,
};
use super::Frame;
use crate::error::{DriverError, Result};

/// State machine for frame reassembly.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Waiting for the STX + length prefix.
    WaitingForPrefix,
    /// Prefix validated; waiting for `total` bytes of complete frame.
    WaitingForBody { total: usize },
}

/// Buffer for accumulating incoming bytes and extracting complete frames.
pub struct FrameBuffer {
    /// Accumulated bytes from socket reads.
    buffer: BytesMut,
    /// Current reassembly state.
    state: State,
    /// Maximum allowed payload size.
    max_payload: usize,
}

impl FrameBuffer {
    /// Create a new frame buffer with the default max payload (1 MB).
    pub fn new() -> Self {
        Self::with_max_payload(DEFAULT_MAX_PAYLOAD_SIZE)
    }

    /// Create a new frame buffer with a custom max payload size.
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4 * 1024),
            state: State::WaitingForPrefix,
            max_payload,
        }
    }

    /// Push data into the buffer and extract all complete frames.
    ///
    /// Returns a vector of complete frames, which may be empty if the data
    /// so far is a fragment. Partial data is buffered for the next push.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InvalidFraming`] when a sentinel mismatches
    /// or a declared length is impossible, and [`DriverError::Protocol`]
    /// when the declared payload exceeds the configured maximum. Either
    /// means the stream is desynchronized and the connection should be
    /// dropped.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Frame>> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some(frame) = self.try_extract_one()? {
            frames.push(frame);
        }
        Ok(frames)
    }

    /// Try to extract a single frame from the buffer.
    fn try_extract_one(&mut self) -> Result<Option<Frame>> {
        match self.state {
            State::WaitingForPrefix => {
                if self.buffer.len() < PREFIX_SIZE {
                    return Ok(None);
                }

                if self.buffer[0] != STX {
                    return Err(DriverError::InvalidFraming(format!(
                        "expected STX 0x02, got {:#04x}",
                        self.buffer[0]
                    )));
                }

                // Prefix is present, checked above.
                let declared = declared_length(&self.buffer).expect("prefix available") as usize;

                if declared < BODY_MIN {
                    return Err(DriverError::InvalidFraming(format!(
                        "declared length {declared} below minimum body of {BODY_MIN}"
                    )));
                }
                if declared - BODY_MIN > self.max_payload {
                    return Err(DriverError::Protocol(format!(
                        "payload size {} exceeds maximum {}",
                        declared - BODY_MIN,
                        self.max_payload
                    )));
                }

                self.state = State::WaitingForBody {
                    total: PREFIX_SIZE + declared + 1,
                };
                self.try_extract_one()
            }

            State::WaitingForBody { total } => {
                if self.buffer.len() < total {
                    return Ok(None);
                }

                let raw = self.buffer.split_to(total);
                self.state = State::WaitingForPrefix;

                // Validates the ETX trailer and length consistency.
                let frame = decode_frame(&raw)?;
                Ok(Some(frame))
            }
        }
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForPrefix;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match self.state {
            State::WaitingForPrefix => "WaitingForPrefix",
            State::WaitingForBody { .. } => "WaitingForBody",
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

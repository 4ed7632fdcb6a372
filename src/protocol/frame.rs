//! Frame struct with typed accessors.
//!
//! Represents a complete protocol frame between the STX and ETX sentinels.
//! Uses `bytes::Bytes` for zero-copy payload sharing.
//!
//! # Example
//!
//! ```
//! use danikor_client::protocol::Frame;
//!
//! let frame = Frame::new(b'r', "0203", b"0101=50;");
//! assert_eq!(frame.message_id(), "0203");
//! assert!(frame.is_curve_sample());
//! assert_eq!(frame.payload(), b"0101=50;");
//! ```

use bytes::Bytes;

/// Message identifier of real-time curve sample frames.
pub const CURVE_MESSAGE_ID: &str = "0203";

/// Message identifier of final tightening result frames.
pub const RESULT_MESSAGE_ID: &str = "0202";

/// A complete protocol frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Declared length from the wire: mode + identifier + payload bytes.
    pub declared_length: u32,
    /// Mode byte (request/response discriminator, not interpreted here).
    pub mode: u8,
    /// 4-character ASCII message identifier.
    pub message_id: String,
    /// Payload bytes between identifier and trailer (zero-copy via `Bytes`).
    pub payload: Bytes,
}

impl Frame {
    /// Create a frame from its parts, computing the declared length.
    pub fn new(mode: u8, message_id: &str, payload: &[u8]) -> Self {
        Self {
            declared_length: (super::wire_format::BODY_MIN + payload.len()) as u32,
            mode,
            message_id: message_id.to_string(),
            payload: Bytes::copy_from_slice(payload),
        }
    }

    /// Get the message identifier.
    #[inline]
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Get a clone of the payload as Bytes (cheap, zero-copy).
    #[inline]
    pub fn payload_bytes(&self) -> Bytes {
        self.payload.clone()
    }

    /// Get the payload length.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Check if this frame carries a real-time curve sample.
    #[inline]
    pub fn is_curve_sample(&self) -> bool {
        self.message_id == CURVE_MESSAGE_ID
    }

    /// Check if this frame carries a final tightening result.
    #[inline]
    pub fn is_tighten_result(&self) -> bool {
        self.message_id == RESULT_MESSAGE_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::wire_format::{decode_frame, encode_command};

    #[test]
    fn test_frame_creation() {
        let frame = Frame::new(b'W', "0103", b"01=2;");
        assert_eq!(frame.mode, b'W');
        assert_eq!(frame.message_id(), "0103");
        assert_eq!(frame.payload(), b"01=2;");
        assert_eq!(frame.payload_len(), 5);
        assert_eq!(frame.declared_length, 10);
    }

    #[test]
    fn test_frame_empty_payload() {
        let frame = Frame::new(b'R', "0001", b"");
        assert!(frame.payload().is_empty());
        assert_eq!(frame.declared_length, 5);
    }

    #[test]
    fn test_message_type_accessors() {
        let curve = Frame::new(b'r', CURVE_MESSAGE_ID, b"");
        assert!(curve.is_curve_sample());
        assert!(!curve.is_tighten_result());

        let result = Frame::new(b'r', RESULT_MESSAGE_ID, b"");
        assert!(result.is_tighten_result());
        assert!(!result.is_curve_sample());
    }

    #[test]
    fn test_payload_bytes_zero_copy() {
        let frame = Frame::new(b'r', "0203", b"0301=1.0");
        let a = frame.payload_bytes();
        let b = frame.payload_bytes();
        assert_eq!(a.as_ptr(), b.as_ptr());
    }

    #[test]
    fn test_new_matches_wire_decode() {
        let wire = encode_command(b"W010301=2;");
        let decoded = decode_frame(&wire).unwrap();
        let built = Frame::new(b'W', "0103", b"01=2;");
        assert_eq!(decoded, built);
    }
}

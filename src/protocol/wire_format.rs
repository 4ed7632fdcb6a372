//! Wire format encoding and decoding.
//!
//! Implements the Danikor frame layout:
//! ```text
//! ┌──────┬──────────┬──────┬───────────┬──────────┬──────┐
//! │ STX  │ Length   │ Mode │ Message ID│ Payload  │ ETX  │
//! │ 0x02 │ 4 bytes  │1 byte│ 4 bytes   │ N bytes  │ 0x03 │
//! │      │ uint32 BE│      │ ASCII     │ ASCII    │      │
//! └──────┴──────────┴──────┴───────────┴──────────┴──────┘
//! ```
//!
//! The declared length covers everything between the length field and the
//! trailer: mode byte + message identifier + payload. The handshake command
//! `R0001` is framed as `02 00000005 "R0001" 03` with a declared length of 5.

use bytes::Bytes;

use super::frame::Frame;
use crate::error::{DriverError, Result};

/// Header sentinel (start of frame).
pub const STX: u8 = 0x02;

/// Trailer sentinel (end of frame).
pub const ETX: u8 = 0x03;

/// Bytes before the body: STX + 4-byte length field.
pub const PREFIX_SIZE: usize = 5;

/// Minimum declared length: mode byte + 4-character message identifier.
pub const BODY_MIN: usize = 5;

/// Minimum decodable frame: prefix + mode + identifier + trailer.
pub const MIN_FRAME_SIZE: usize = PREFIX_SIZE + BODY_MIN + 1;

/// Offset of the mode byte within a frame.
pub const MODE_OFFSET: usize = 5;

/// Offset of the 4-character message identifier.
pub const ID_OFFSET: usize = 6;

/// Length of the message identifier.
pub const ID_LEN: usize = 4;

/// Offset of the payload within a frame.
pub const PAYLOAD_OFFSET: usize = 10;

/// Default maximum payload size (1 MB). Device frames are small; anything
/// near this limit indicates a desynchronized stream.
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

/// Wrap an already-built command (mode + identifier + optional payload)
/// with STX, big-endian length field and ETX.
///
/// # Example
///
/// ```
/// use danikor_client::protocol::encode_command;
///
/// let wire = encode_command(b"R0001");
/// assert_eq!(wire, [0x02, 0, 0, 0, 5, b'R', b'0', b'0', b'0', b'1', 0x03]);
/// ```
pub fn encode_command(command: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(PREFIX_SIZE + command.len() + 1);
    buf.push(STX);
    buf.extend_from_slice(&(command.len() as u32).to_be_bytes());
    buf.extend_from_slice(command);
    buf.push(ETX);
    buf
}

/// Read the declared length field from a frame prefix.
///
/// Returns `None` if fewer than [`PREFIX_SIZE`] bytes are available.
pub fn declared_length(buf: &[u8]) -> Option<u32> {
    if buf.len() < PREFIX_SIZE {
        return None;
    }
    Some(u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]))
}

/// Decode a complete frame from a byte buffer.
///
/// The buffer must hold exactly one frame. Fails with
/// [`DriverError::FrameTooShort`] below the 11-byte minimum and
/// [`DriverError::InvalidFraming`] when a sentinel mismatches or the
/// declared length disagrees with the bytes actually present.
///
/// # Example
///
/// ```
/// use danikor_client::protocol::{decode_frame, encode_command};
///
/// let wire = encode_command(b"R0203");
/// let frame = decode_frame(&wire).unwrap();
/// assert_eq!(frame.mode, b'R');
/// assert_eq!(frame.message_id(), "0203");
/// assert!(frame.payload().is_empty());
/// ```
pub fn decode_frame(buf: &[u8]) -> Result<Frame> {
    if buf.len() < MIN_FRAME_SIZE {
        return Err(DriverError::FrameTooShort {
            needed: MIN_FRAME_SIZE,
            got: buf.len(),
        });
    }

    if buf[0] != STX {
        return Err(DriverError::InvalidFraming(format!(
            "expected STX 0x02, got {:#04x}",
            buf[0]
        )));
    }

    let trailer = buf[buf.len() - 1];
    if trailer != ETX {
        return Err(DriverError::InvalidFraming(format!(
            "expected ETX 0x03, got {trailer:#04x}"
        )));
    }

    let declared = u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]);
    let body_len = buf.len() - PREFIX_SIZE - 1;
    if declared as usize != body_len {
        return Err(DriverError::InvalidFraming(format!(
            "declared length {declared} does not match {body_len} body bytes on the wire"
        )));
    }

    let message_id = String::from_utf8_lossy(&buf[ID_OFFSET..ID_OFFSET + ID_LEN]).into_owned();
    let payload = Bytes::copy_from_slice(&buf[PAYLOAD_OFFSET..buf.len() - 1]);

    Ok(Frame {
        declared_length: declared,
        mode: buf[MODE_OFFSET],
        message_id,
        payload,
    })
}

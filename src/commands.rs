//! Fixed device commands.
//!
//! These are opaque byte strings from the codec's point of view; only
//! their framing is interpreted. [`crate::protocol::encode_command`] wraps
//! them with STX, length field and ETX before they go on the wire.

use crate::error::{DriverError, Result};

/// Handshake / establish communication (mid `R0001`).
pub const ESTABLISH: &[u8] = b"R0001";

/// Subscribe to real-time curve data (mid `R0203`).
pub const SUBSCRIBE_CURVE: &[u8] = b"R0203";

/// Subscribe to final result data (mid `R0202`).
pub const SUBSCRIBE_RESULT: &[u8] = b"R0202";

/// Command the tool to rotate forward.
pub const FORWARD_ROTATION: &[u8] = b"W030101=1;";

/// Lowest selectable program set number.
pub const PSET_MIN: u8 = 1;

/// Highest selectable program set number.
pub const PSET_MAX: u8 = 8;

/// Format the command selecting active program set `pset`.
///
/// Validates the range before any I/O happens; the device stores eight
/// program sets.
///
/// # Example
///
/// ```
/// use danikor_client::commands::pset_select;
///
/// assert_eq!(pset_select(2).unwrap(), b"W010301=2;");
/// assert!(pset_select(9).is_err());
/// ```
pub fn pset_select(pset: u8) -> Result<Vec<u8>> {
    if !(PSET_MIN..=PSET_MAX).contains(&pset) {
        return Err(DriverError::PsetOutOfRange(pset));
    }
    Ok(format!("W010301={pset};").into_bytes())
}

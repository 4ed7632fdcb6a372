//! Payload decoding for the two known message types.
//!
//! Device payloads are ASCII text: `;`-delimited `key=value` segments, with
//! list values further delimited by `,`. Decoding is table-driven and
//! deliberately lenient: segments without exactly one `=` are dropped,
//! unknown tags are ignored and unparsable numeric fields default to zero.
//! The device emits partial or noisy output in the field and a malformed
//! segment must never poison the rest of a record.
//!
//! # Example
//!
//! ```
//! use danikor_client::codec::{decode_body, Body};
//!
//! let body = decode_body("0203", b"0101=50;0301=12.5,13.0;");
//! let Body::Curve(sample) = body else { panic!() };
//! assert_eq!(sample.sample_frequency, "50");
//! assert_eq!(sample.torque, [12.5, 13.0]);
//! ```

mod curve;
mod result;

pub use curve::{decode_curve, CurveSample};
pub use result::{decode_result, StageResult, TightenResult};

use crate::protocol::{Frame, CURVE_MESSAGE_ID, RESULT_MESSAGE_ID};

/// Decoded payload body, selected by the frame's message identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Real-time curve sample (`"0203"`).
    Curve(CurveSample),
    /// Final tightening result (`"0202"`).
    Result(TightenResult),
    /// Any other message identifier: payload left undecoded on the frame.
    Unknown,
}

/// Decode a payload by message identifier.
///
/// Unknown identifiers are a pass-through, not an error.
pub fn decode_body(message_id: &str, payload: &[u8]) -> Body {
    match message_id {
        CURVE_MESSAGE_ID => Body::Curve(decode_curve(payload)),
        RESULT_MESSAGE_ID => Body::Result(decode_result(payload)),
        _ => Body::Unknown,
    }
}

/// A decoded inbound frame: the raw frame plus its typed body.
///
/// This is the unit the receive loop delivers to consumers. Records are
/// value data, produced once per frame and owned by the receiver.
#[derive(Debug, Clone)]
pub struct Message {
    /// The frame as it came off the wire.
    pub frame: Frame,
    /// Typed body, if the message identifier is known.
    pub body: Body,
}

impl Message {
    /// Decode a frame's payload into a message.
    pub fn decode(frame: Frame) -> Self {
        let body = decode_body(frame.message_id(), frame.payload());
        Self { frame, body }
    }

    /// Get the curve sample, if this message carries one.
    pub fn as_curve(&self) -> Option<&CurveSample> {
        match &self.body {
            Body::Curve(sample) => Some(sample),
            _ => None,
        }
    }

    /// Get the tightening result, if this message carries one.
    pub fn as_result(&self) -> Option<&TightenResult> {
        match &self.body {
            Body::Result(result) => Some(result),
            _ => None,
        }
    }
}

/// Split a segment into `(tag, value)`, requiring exactly one `=`.
///
/// Segments with zero or multiple `=` characters are malformed and dropped.
pub(crate) fn split_pair(segment: &str) -> Option<(&str, &str)> {
    let mut parts = segment.splitn(3, '=');
    let tag = parts.next()?;
    let value = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((tag, value))
}

/// Lenient float parse: unparsable input decodes to zero.
pub(crate) fn parse_f64_lenient(value: &str) -> f64 {
    value.trim().parse().unwrap_or(0.0)
}

/// Comma-separated float list with lenient element parsing.
pub(crate) fn parse_f64_list(value: &str) -> Vec<f64> {
    value.split(',').map(parse_f64_lenient).collect()
}

/// Comma-separated integer list with lenient element parsing.
pub(crate) fn parse_i32_list(value: &str) -> Vec<i32> {
    value
        .split(',')
        .map(|v| v.trim().parse().unwrap_or(0))
        .collect()
}

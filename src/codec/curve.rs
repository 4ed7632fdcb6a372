//! Real-time curve sample decoding (message id `"0203"`).

use serde::Serialize;

use super::{parse_f64_list, parse_i32_list, split_pair};

/// One real-time torque/angle curve sample.
///
/// Torque and angle sequences are parallel by protocol convention (same
/// index = same instant); the decoder does not enforce equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurveSample {
    /// Sample frequency, verbatim text (tag `0101`).
    pub sample_frequency: String,
    /// Active program set identifier, verbatim text (tag `0102`).
    pub pset: String,
    /// Curve-end flag (tag `0201`, true iff value is `"1"`).
    pub is_curve_end: bool,
    /// Curve-start flag (tag `0202`, same rule).
    pub is_curve_start: bool,
    /// Torque readings (tag `0301`).
    pub torque: Vec<f64>,
    /// Angle readings (tag `0302`).
    pub angle: Vec<f64>,
    /// Active program set numbers (tag `0401`).
    pub current_pset: Vec<i32>,
}

/// Decode a curve sample payload.
///
/// Best-effort by design: malformed segments and unknown tags are skipped,
/// unparsable numeric entries decode to zero. Never fails.
pub fn decode_curve(payload: &[u8]) -> CurveSample {
    let text = String::from_utf8_lossy(payload);
    let mut sample = CurveSample::default();

    for segment in text.split(';') {
        let Some((tag, value)) = split_pair(segment) else {
            continue;
        };
        match tag {
            "0101" => sample.sample_frequency = value.to_string(),
            "0102" => sample.pset = value.to_string(),
            "0201" => sample.is_curve_end = value == "1",
            "0202" => sample.is_curve_start = value == "1",
            "0301" => sample.torque = parse_f64_list(value),
            "0302" => sample.angle = parse_f64_list(value),
            "0401" => sample.current_pset = parse_i32_list(value),
            _ => {}
        }
    }

    sample
}

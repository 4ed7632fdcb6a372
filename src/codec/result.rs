//! Final tightening result decoding (message id `"0202"`).

use std::collections::BTreeMap;

use serde::Serialize;

use super::{parse_f64_lenient, split_pair};

/// Per-stage torque/angle/time breakdown of a tightening.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageResult {
    pub torque: f64,
    pub angle: f64,
    pub time: f64,
}

/// Final tightening result with per-stage breakdown.
///
/// Final fields are kept verbatim as text; status and NG codes are raw
/// device codes, not interpreted here. Stages are keyed by their
/// single-character identifier (`'1'..`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TightenResult {
    /// Final torque value (tag `00010`, field 0).
    pub final_torque: String,
    /// Final angle at monitor (tag `00010`, field 1).
    pub final_angle_monitor: String,
    /// Final elapsed time (tag `00010`, field 2).
    pub final_time: String,
    /// Final angle (tag `00010`, field 3).
    pub final_angle: String,
    /// Final pass/fail status code (tag `00011`).
    pub final_status: String,
    /// Final NG diagnostic code (tag `00012`).
    pub ng_code: String,
    /// Stage value entries (tags `010<k>…0`).
    pub stage_results: BTreeMap<char, StageResult>,
    /// Stage status codes, verbatim (tags `010<k>…1`).
    pub stage_status: BTreeMap<char, String>,
}

/// Decode a tightening result payload.
///
/// Best-effort like the curve decoder: malformed segments are dropped and
/// never fail the whole record.
pub fn decode_result(payload: &[u8]) -> TightenResult {
    let text = String::from_utf8_lossy(payload);
    let mut result = TightenResult::default();

    for segment in text.split(';') {
        let Some((tag, value)) = split_pair(segment) else {
            continue;
        };
        match tag {
            "00010" => {
                let fields: Vec<&str> = value.split(',').collect();
                if fields.len() >= 4 {
                    result.final_torque = fields[0].to_string();
                    result.final_angle_monitor = fields[1].to_string();
                    result.final_time = fields[2].to_string();
                    result.final_angle = fields[3].to_string();
                }
            }
            "00011" => result.final_status = value.to_string(),
            "00012" => result.ng_code = value.to_string(),
            _ => decode_stage_segment(tag, value, &mut result),
        }
    }

    result
}

/// Decode one stage entry. Tags are `010` + stage key + suffix, at least
/// five characters, ending in `0` (value triplet) or `1` (status code).
/// Any other tag shape is ignored.
fn decode_stage_segment(tag: &str, value: &str, result: &mut TightenResult) {
    if tag.len() < 5 || !tag.starts_with("010") {
        return;
    }
    let Some(stage) = tag.chars().nth(3) else {
        return;
    };

    if tag.ends_with('0') {
        if let Some(triplet) = parse_stage_triplet(value) {
            result.stage_results.insert(stage, triplet);
        }
    } else if tag.ends_with('1') {
        result.stage_status.insert(stage, value.to_string());
    }
}

/// Parse a stage value into torque/angle/time.
///
/// Some firmware revisions prepend a 5-character echo before the triplet;
/// accept that form when the remainder is a clean triplet, otherwise take
/// the value as the triplet itself. Anything but exactly three
/// comma-separated fields is discarded.
fn parse_stage_triplet(value: &str) -> Option<StageResult> {
    if let Some(rest) = value.get(5..) {
        if let Some(triplet) = strict_triplet(rest) {
            return Some(triplet);
        }
    }
    lenient_triplet(value)
}

fn strict_triplet(value: &str) -> Option<StageResult> {
    let fields: Vec<&str> = value.split(',').collect();
    if fields.len() != 3 {
        return None;
    }
    Some(StageResult {
        torque: fields[0].trim().parse().ok()?,
        angle: fields[1].trim().parse().ok()?,
        time: fields[2].trim().parse().ok()?,
    })
}

fn lenient_triplet(value: &str) -> Option<StageResult> {
    let fields: Vec<&str> = value.split(',').collect();
    if fields.len() != 3 {
        return None;
    }
    Some(StageResult {
        torque: parse_f64_lenient(fields[0]),
        angle: parse_f64_lenient(fields[1]),
        time: parse_f64_lenient(fields[2]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_result() {
        let result = decode_result(
            b"00010=1.2,3.4,5.6,7.8;00011=1;00012=00;01010=0.013,1257.069,3.000;01011=1",
        );

        assert_eq!(result.final_torque, "1.2");
        assert_eq!(result.final_angle_monitor, "3.4");
        assert_eq!(result.final_time, "5.6");
        assert_eq!(result.final_angle, "7.8");
        assert_eq!(result.final_status, "1");
        assert_eq!(result.ng_code, "00");

        assert_eq!(
            result.stage_results.get(&'1'),
            Some(&StageResult {
                torque: 0.013,
                angle: 1257.069,
                time: 3.000,
            })
        );
        assert_eq!(result.stage_status.get(&'1'), Some(&"1".to_string()));
    }

    #[test]
    fn test_final_fields_require_four_values() {
        let result = decode_result(b"00010=1.2,3.4,5.6");
        assert!(result.final_torque.is_empty());
        assert!(result.final_angle_monitor.is_empty());
        assert!(result.final_time.is_empty());
        assert!(result.final_angle.is_empty());
    }

    #[test]
    fn test_multiple_stages_ordered() {
        let result = decode_result(
            b"01010=0.1,10.0,1.0;01020=0.2,20.0,2.0;01030=0.3,30.0,3.0;01011=1;01021=2",
        );

        let keys: Vec<char> = result.stage_results.keys().copied().collect();
        assert_eq!(keys, ['1', '2', '3']);
        assert_eq!(result.stage_results[&'2'].angle, 20.0);
        assert_eq!(result.stage_status[&'2'], "2");
    }

    #[test]
    fn test_stage_value_with_echo_prefix() {
        // 5-character echo glued in front of the triplet.
        let result = decode_result(b"01040=010400.5,45.0,1.5");
        assert_eq!(
            result.stage_results.get(&'4'),
            Some(&StageResult {
                torque: 0.5,
                angle: 45.0,
                time: 1.5,
            })
        );
    }

    #[test]
    fn test_stage_value_wrong_field_count_dropped() {
        let result = decode_result(b"01010=0.1,10.0");
        assert!(result.stage_results.is_empty());
    }

    #[test]
    fn test_non_stage_tags_ignored() {
        // Wrong prefix, too short, or suffix that is neither 0 nor 1.
        let result = decode_result(b"02010=0.1,1.0,2.0;0101=x;01012=y");
        assert!(result.stage_results.is_empty());
        assert!(result.stage_status.is_empty());
    }

    #[test]
    fn test_malformed_segments_do_not_poison_record() {
        let result = decode_result(b"junk;00011=2;a=b=c;00012=03");
        assert_eq!(result.final_status, "2");
        assert_eq!(result.ng_code, "03");
    }

    #[test]
    fn test_empty_payload_is_default_record() {
        assert_eq!(decode_result(b""), TightenResult::default());
    }

    #[test]
    fn test_serializes_to_json() {
        let result = decode_result(b"00011=1;01010=0.5,10.0,1.0");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["final_status"], "1");
        assert_eq!(json["stage_results"]["1"]["angle"], 10.0);
    }
}

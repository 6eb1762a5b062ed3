//! JSON serialization of proof records and reports.

use serde::Serialize;

/// Serialize any report to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for crate types).
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

/// Serialize any report to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for crate types).
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::Family;
    use crate::wheel::{SlotPolicy, Wheel, WheelSet};

    fn make_wheels() -> WheelSet {
        let mut wheel = Wheel::new(0, Family::Beaufort, 3, 1);
        wheel.force(4, 7, "X", SlotPolicy::Distinct);
        WheelSet::new("mod(1)", 6, vec![wheel])
    }

    #[test]
    fn test_wheel_set_json_round_trip() {
        let wheels = make_wheels();
        let json = to_json(&wheels).unwrap();
        assert!(json.contains("\"Beaufort\""));
        assert!(json.contains("mod(1)"));
        let back: WheelSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, wheels);
    }

    #[test]
    fn test_digest_serializes_as_hex() {
        let digest = crate::types::Digest::of_text("abc");
        let json = to_json(&digest).unwrap();
        assert_eq!(
            json,
            "\"ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad\""
        );
    }

    #[test]
    fn test_pretty_json_is_multiline() {
        let json = to_json_pretty(&make_wheels()).unwrap();
        assert!(json.lines().count() > 1);
    }
}

//! IBM mainframe ↔ IEEE 754 double conversion.
//!
//! SAS Transport numerics are stored as IBM System/360 hexadecimal floats:
//!
//! | Bits  | Field                                   |
//! |-------|-----------------------------------------|
//! | 63    | sign                                    |
//! | 62-56 | base-16 exponent, excess 64             |
//! | 55-0  | fraction `0.f`, normalized to ≥ 1/16    |
//!
//! Missing values use a single marker byte (`.`, `_`, `A`-`Z`) followed by
//! zero bytes.

use crate::types::MissingValue;

const EXPONENT_BIAS: i32 = 64;
const FRACTION_BITS: i32 = 56;
const FRACTION_MASK: u64 = 0x00ff_ffff_ffff_ffff;

/// Convert 8 IBM bytes (big-endian) to an IEEE double.
///
/// Precision beyond the 53 bits of an `f64` mantissa is rounded.
#[must_use]
pub fn ibm_to_ieee(bytes: [u8; 8]) -> f64 {
    let raw = u64::from_be_bytes(bytes);
    let fraction = raw & FRACTION_MASK;
    if fraction == 0 {
        return 0.0;
    }
    let negative = raw >> 63 == 1;
    let exponent = ((raw >> 56) & 0x7f) as i32;
    let scale = 4 * (exponent - EXPONENT_BIAS) - FRACTION_BITS;
    let magnitude = fraction as f64 * 2f64.powi(scale);
    if negative { -magnitude } else { magnitude }
}

/// Convert an IEEE double to 8 IBM bytes (big-endian).
///
/// Zero maps to all-zero bytes. Non-finite values are the caller's concern
/// (the writer encodes them as missing). Magnitudes outside the IBM range
/// saturate at the exponent limits.
#[must_use]
pub fn ieee_to_ibm(value: f64) -> [u8; 8] {
    if value == 0.0 || !value.is_finite() {
        return [0u8; 8];
    }
    let negative = value.is_sign_negative();
    let mut mantissa = value.abs();
    let mut exponent = EXPONENT_BIAS;
    // Scaling by 16 is exact in binary floating point.
    while mantissa >= 1.0 {
        mantissa /= 16.0;
        exponent += 1;
    }
    while mantissa < 1.0 / 16.0 {
        mantissa *= 16.0;
        exponent -= 1;
    }
    let exponent = exponent.clamp(0, 127) as u64;
    let fraction = (mantissa * 2f64.powi(FRACTION_BITS)) as u64 & FRACTION_MASK;
    let sign = if negative { 1u64 << 63 } else { 0 };
    (sign | (exponent << 56) | fraction).to_be_bytes()
}

/// Detect a SAS missing value in a numeric field.
///
/// Returns the missing code when the first byte is a marker and every other
/// byte is zero.
#[must_use]
pub fn is_missing(bytes: &[u8]) -> Option<MissingValue> {
    let (&marker, rest) = bytes.split_first()?;
    if rest.iter().any(|&b| b != 0) {
        return None;
    }
    MissingValue::from_byte(marker)
}

/// Encode a SAS missing value as 8 bytes.
#[must_use]
pub fn encode_missing(missing: MissingValue) -> [u8; 8] {
    let mut bytes = [0u8; 8];
    bytes[0] = missing.to_byte();
    bytes
}

/// Truncate an 8-byte IBM value to the variable length (3..=8 bytes).
#[must_use]
pub fn truncate_ibm(bytes: [u8; 8], length: usize) -> Vec<u8> {
    let len = length.clamp(1, 8);
    bytes[..len].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_encodings() {
        assert_eq!(ieee_to_ibm(1.0), [0x41, 0x10, 0, 0, 0, 0, 0, 0]);
        assert_eq!(ieee_to_ibm(-1.0), [0xc1, 0x10, 0, 0, 0, 0, 0, 0]);
        assert_eq!(ieee_to_ibm(0.0), [0u8; 8]);
        // 20566 days: an arrival offset from the real dataset
        let bytes = ieee_to_ibm(20566.0);
        assert_eq!(ibm_to_ieee(bytes), 20566.0);
    }

    #[test]
    fn test_decode_fraction() {
        // 0.5 = 0x40 0x80...
        assert_eq!(ibm_to_ieee([0x40, 0x80, 0, 0, 0, 0, 0, 0]), 0.5);
        assert_eq!(ibm_to_ieee([0x42, 0x64, 0, 0, 0, 0, 0, 0]), 100.0);
    }

    #[test]
    fn test_missing_detection() {
        assert_eq!(
            is_missing(&encode_missing(MissingValue::Standard)),
            Some(MissingValue::Standard)
        );
        assert_eq!(
            is_missing(&encode_missing(MissingValue::Special('Z'))),
            Some(MissingValue::Special('Z'))
        );
        // 1.0 starts with 0x41 ('A') but carries a fraction
        assert_eq!(is_missing(&ieee_to_ibm(1.0)), None);
        assert_eq!(is_missing(&[]), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate_ibm(ieee_to_ibm(1.0), 3), vec![0x41, 0x10, 0]);
        assert_eq!(truncate_ibm(ieee_to_ibm(1.0), 8).len(), 8);
    }

    proptest! {
        #[test]
        fn integers_roundtrip_exactly(value in -1_000_000_000i64..1_000_000_000i64) {
            let as_float = value as f64;
            prop_assert_eq!(ibm_to_ieee(ieee_to_ibm(as_float)), as_float);
        }

        #[test]
        fn floats_roundtrip_closely(value in -1.0e12f64..1.0e12f64) {
            let back = ibm_to_ieee(ieee_to_ibm(value));
            prop_assert!((back - value).abs() <= value.abs() * 1e-15);
        }
    }
}

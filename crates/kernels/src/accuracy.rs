//! ULP-based accuracy measurement.

use crate::helpers::assert_same_len;

/// Distance between two floats in units in the last place.
///
/// - `+0.0` and `-0.0` are 0 apart
/// - two NaNs are 0 apart; a NaN and a number are `u32::MAX` apart
/// - adjacent representable values are 1 apart, across zero included
pub fn ulp_distance(a: f32, b: f32) -> u32 {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => return 0,
        (true, false) | (false, true) => return u32::MAX,
        _ => {}
    }
    if a == b {
        return 0;
    }
    let diff = ordered_bits(a).abs_diff(ordered_bits(b));
    u32::try_from(diff).unwrap_or(u32::MAX)
}

/// Largest [`ulp_distance`] between matching elements.
///
/// # Panics
/// If the slices differ in length.
pub fn max_ulp_error(actual: &[f32], expected: &[f32]) -> u32 {
    assert_same_len(&[actual.len(), expected.len()]);
    actual
        .iter()
        .zip(expected)
        .map(|(&a, &e)| ulp_distance(a, e))
        .max()
        .unwrap_or(0)
}

/// Map float bits onto a line where adjacent floats differ by one.
fn ordered_bits(x: f32) -> i64 {
    let bits = x.to_bits() as i32;
    if bits < 0 {
        i64::from(i32::MIN) - i64::from(bits)
    } else {
        i64::from(bits)
    }
}

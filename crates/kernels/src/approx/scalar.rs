//! Correctly rounded scalar baselines.

use crate::helpers::assert_same_len;

#[inline]
pub(crate) fn rcp_one(x: f32) -> f32 {
    1.0 / x
}

/// Correctly rounded `1 / sqrt(x)`.
///
/// The f64 estimate is within one f32 ULP but may round the wrong way, so
/// it is checked against the midpoints to its neighbours. For a midpoint
/// `m`, `1 / sqrt(x) > m` exactly when `m * m * x < 1`. `m` has at most 25
/// significant bits, so `m * m` is exact in f64 and the fused
/// `m * m * x - 1` has the exact sign. A midpoint is never hit exactly.
#[inline]
pub(crate) fn rsqrt_one(x: f32) -> f32 {
    let estimate = (1.0 / libm::sqrt(f64::from(x))) as f32;
    if !(x > 0.0 && x.is_finite()) {
        return estimate;
    }

    let x = f64::from(x);
    let beyond = |midpoint: f64| libm::fma(midpoint * midpoint, x, -1.0);
    let up = estimate.next_up();
    if beyond((f64::from(estimate) + f64::from(up)) / 2.0) < 0.0 {
        return up;
    }
    let down = estimate.next_down();
    if beyond((f64::from(estimate) + f64::from(down)) / 2.0) > 0.0 {
        return down;
    }
    estimate
}

pub(super) fn rcp(input: &[f32], output: &mut [f32]) {
    assert_same_len(&[input.len(), output.len()]);
    for (o, &x) in output.iter_mut().zip(input) {
        *o = rcp_one(x);
    }
}

pub(super) fn rsqrt(input: &[f32], output: &mut [f32]) {
    assert_same_len(&[input.len(), output.len()]);
    for (o, &x) in output.iter_mut().zip(input) {
        *o = rsqrt_one(x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_values() {
        let mut out = [0.0; 3];
        rcp(&[2.0, 0.25, -4.0], &mut out);
        assert_eq!(out, [0.5, 4.0, -0.25]);
        rsqrt(&[4.0, 0.25, 1.0], &mut out);
        assert_eq!(out, [0.5, 2.0, 1.0]);
    }

    #[test]
    fn test_rsqrt_matches_exact_squares() {
        // x = 4^k gives exactly representable results.
        for k in -30..30 {
            let x = 4f32.powi(k);
            assert_eq!(rsqrt_one(x), 2f32.powi(-k), "rsqrt({x})");
        }
        assert_eq!(rsqrt_one(f32::from_bits(1)), 2f32.powi(74) * std::f32::consts::SQRT_2);
    }

    #[test]
    fn test_special_values() {
        assert_eq!(rcp_one(0.0), f32::INFINITY);
        assert_eq!(rsqrt_one(f32::INFINITY), 0.0);
        assert!(rsqrt_one(-1.0).is_nan());
    }
}

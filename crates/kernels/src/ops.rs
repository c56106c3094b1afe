//! Element-wise slice kernels.
//!
//! Every function here is declared through `multiversion!`: the body is
//! compiled once per profile and the best supported copy is chosen on first
//! call. All of them are exact, so every variant produces bit-identical
//! output to the baseline.
//!
//! All slices passed to one call must have the same length; a mismatch
//! panics.

use multiver_dispatch::multiversion;

use crate::helpers::assert_same_len;

/// Lane mask value for a true comparison.
pub const MASK_TRUE: u32 = u32::MAX;
/// Lane mask value for a false comparison.
pub const MASK_FALSE: u32 = 0;

// ============================================================================
// Arithmetic
// ============================================================================

multiversion! {
    /// Element-wise addition: `output[i] = a[i] + b[i]`
    pub fn add_f32(a: &[f32], b: &[f32], output: &mut [f32]) {
        assert_same_len(&[a.len(), b.len(), output.len()]);
        for ((o, &x), &y) in output.iter_mut().zip(a).zip(b) {
            *o = x + y;
        }
    }

    /// Element-wise subtraction: `output[i] = a[i] - b[i]`
    pub fn sub_f32(a: &[f32], b: &[f32], output: &mut [f32]) {
        assert_same_len(&[a.len(), b.len(), output.len()]);
        for ((o, &x), &y) in output.iter_mut().zip(a).zip(b) {
            *o = x - y;
        }
    }

    /// Element-wise multiplication: `output[i] = a[i] * b[i]`
    pub fn mul_f32(a: &[f32], b: &[f32], output: &mut [f32]) {
        assert_same_len(&[a.len(), b.len(), output.len()]);
        for ((o, &x), &y) in output.iter_mut().zip(a).zip(b) {
            *o = x * y;
        }
    }

    /// Element-wise IEEE division: `output[i] = a[i] / b[i]`
    pub fn div_f32(a: &[f32], b: &[f32], output: &mut [f32]) {
        assert_same_len(&[a.len(), b.len(), output.len()]);
        for ((o, &x), &y) in output.iter_mut().zip(a).zip(b) {
            *o = x / y;
        }
    }

    /// Fused multiply-add with a single rounding: `output[i] = a[i] * b[i] + c[i]`
    ///
    /// Profiles with FMA use the hardware instruction; the others call the
    /// correctly rounded software routine, so results agree bit for bit.
    pub fn fma_f32(a: &[f32], b: &[f32], c: &[f32], output: &mut [f32]) {
        assert_same_len(&[a.len(), b.len(), c.len(), output.len()]);
        for (((o, &x), &y), &z) in output.iter_mut().zip(a).zip(b).zip(c) {
            *o = x.mul_add(y, z);
        }
    }

    /// Element-wise minimum.
    ///
    /// Returns `b[i]` when `b[i] < a[i]`, otherwise `a[i]`. A NaN in `b`
    /// therefore yields `a[i]` and a NaN in `a` propagates, the same rule
    /// as x86 `minps` with the operands swapped.
    pub fn min_f32(a: &[f32], b: &[f32], output: &mut [f32]) {
        assert_same_len(&[a.len(), b.len(), output.len()]);
        for ((o, &x), &y) in output.iter_mut().zip(a).zip(b) {
            *o = if y < x { y } else { x };
        }
    }

    /// Element-wise maximum; `b[i]` when `b[i] > a[i]`, otherwise `a[i]`.
    pub fn max_f32(a: &[f32], b: &[f32], output: &mut [f32]) {
        assert_same_len(&[a.len(), b.len(), output.len()]);
        for ((o, &x), &y) in output.iter_mut().zip(a).zip(b) {
            *o = if y > x { y } else { x };
        }
    }

    /// Correctly rounded square root.
    pub fn sqrt_f32(input: &[f32], output: &mut [f32]) {
        assert_same_len(&[input.len(), output.len()]);
        for (o, &x) in output.iter_mut().zip(input) {
            *o = x.sqrt();
        }
    }

    /// Absolute value (clears the sign bit, NaN payloads included).
    pub fn abs_f32(input: &[f32], output: &mut [f32]) {
        assert_same_len(&[input.len(), output.len()]);
        for (o, &x) in output.iter_mut().zip(input) {
            *o = x.abs();
        }
    }

    /// Negation (flips the sign bit).
    pub fn neg_f32(input: &[f32], output: &mut [f32]) {
        assert_same_len(&[input.len(), output.len()]);
        for (o, &x) in output.iter_mut().zip(input) {
            *o = -x;
        }
    }
}

// ============================================================================
// Integer
// ============================================================================

multiversion! {
    /// Wrapping integer addition.
    pub fn add_i32(a: &[i32], b: &[i32], output: &mut [i32]) {
        assert_same_len(&[a.len(), b.len(), output.len()]);
        for ((o, &x), &y) in output.iter_mut().zip(a).zip(b) {
            *o = x.wrapping_add(y);
        }
    }

    /// Wrapping integer subtraction.
    pub fn sub_i32(a: &[i32], b: &[i32], output: &mut [i32]) {
        assert_same_len(&[a.len(), b.len(), output.len()]);
        for ((o, &x), &y) in output.iter_mut().zip(a).zip(b) {
            *o = x.wrapping_sub(y);
        }
    }
}

// ============================================================================
// Bitwise
// ============================================================================

multiversion! {
    pub fn and_u32(a: &[u32], b: &[u32], output: &mut [u32]) {
        assert_same_len(&[a.len(), b.len(), output.len()]);
        for ((o, &x), &y) in output.iter_mut().zip(a).zip(b) {
            *o = x & y;
        }
    }

    pub fn or_u32(a: &[u32], b: &[u32], output: &mut [u32]) {
        assert_same_len(&[a.len(), b.len(), output.len()]);
        for ((o, &x), &y) in output.iter_mut().zip(a).zip(b) {
            *o = x | y;
        }
    }

    pub fn xor_u32(a: &[u32], b: &[u32], output: &mut [u32]) {
        assert_same_len(&[a.len(), b.len(), output.len()]);
        for ((o, &x), &y) in output.iter_mut().zip(a).zip(b) {
            *o = x ^ y;
        }
    }

    pub fn not_u32(input: &[u32], output: &mut [u32]) {
        assert_same_len(&[input.len(), output.len()]);
        for (o, &x) in output.iter_mut().zip(input) {
            *o = !x;
        }
    }
}

// ============================================================================
// Comparison
// ============================================================================

multiversion! {
    /// Lane mask of `a[i] < b[i]`: [`MASK_TRUE`] or [`MASK_FALSE`].
    /// Comparisons involving NaN are false.
    pub fn cmp_lt_f32(a: &[f32], b: &[f32], output: &mut [u32]) {
        assert_same_len(&[a.len(), b.len(), output.len()]);
        for ((o, &x), &y) in output.iter_mut().zip(a).zip(b) {
            *o = if x < y { MASK_TRUE } else { MASK_FALSE };
        }
    }

    /// Lane mask of `a[i] == b[i]`. `-0.0 == 0.0`; NaN is never equal.
    pub fn cmp_eq_f32(a: &[f32], b: &[f32], output: &mut [u32]) {
        assert_same_len(&[a.len(), b.len(), output.len()]);
        for ((o, &x), &y) in output.iter_mut().zip(a).zip(b) {
            *o = if x == y { MASK_TRUE } else { MASK_FALSE };
        }
    }
}

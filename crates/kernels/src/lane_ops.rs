//! Single-register lane kernels.
//!
//! These take and return one [`Vector`](crate::Vector) by value, the shape a
//! vector expression works in between loads and stores.

use multiver_dispatch::multiversion;

use crate::lanes::{F32x4, I32x4, U32x4};

multiversion! {
    #[must_use]
    pub fn add_f32x4(a: F32x4, b: F32x4) -> F32x4 {
        a.zip_map(b, |x, y| x + y)
    }

    #[must_use]
    pub fn sub_f32x4(a: F32x4, b: F32x4) -> F32x4 {
        a.zip_map(b, |x, y| x - y)
    }

    #[must_use]
    pub fn mul_f32x4(a: F32x4, b: F32x4) -> F32x4 {
        a.zip_map(b, |x, y| x * y)
    }

    /// Same NaN rule as [`min_f32`](crate::ops::min_f32).
    #[must_use]
    pub fn min_f32x4(a: F32x4, b: F32x4) -> F32x4 {
        a.zip_map(b, |x, y| if y < x { y } else { x })
    }

    /// Same NaN rule as [`max_f32`](crate::ops::max_f32).
    #[must_use]
    pub fn max_f32x4(a: F32x4, b: F32x4) -> F32x4 {
        a.zip_map(b, |x, y| if y > x { y } else { x })
    }

    /// Wrapping addition.
    #[must_use]
    pub fn add_i32x4(a: I32x4, b: I32x4) -> I32x4 {
        a.zip_map(b, i32::wrapping_add)
    }

    #[must_use]
    pub fn and_u32x4(a: U32x4, b: U32x4) -> U32x4 {
        a.zip_map(b, |x, y| x & y)
    }

    #[must_use]
    pub fn or_u32x4(a: U32x4, b: U32x4) -> U32x4 {
        a.zip_map(b, |x, y| x | y)
    }

    #[must_use]
    pub fn xor_u32x4(a: U32x4, b: U32x4) -> U32x4 {
        a.zip_map(b, |x, y| x ^ y)
    }

    #[must_use]
    pub fn not_u32x4(a: U32x4) -> U32x4 {
        a.map(|x| !x)
    }
}

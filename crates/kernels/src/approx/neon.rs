//! NEON approximate kernels (aarch64)
//!
//! `vrecpe`/`vrsqrte` give roughly 8 bits; two Newton-Raphson steps using
//! the dedicated step instructions bring them to within a few ULPs.

use core::arch::aarch64::*;

use super::scalar::{rcp_one, rsqrt_one};
use crate::helpers::{process_unary, LaneBlock};

/// 4 lanes of f32 in a NEON register.
#[derive(Copy, Clone)]
#[repr(transparent)]
struct NeonBlock(float32x4_t);

impl LaneBlock for NeonBlock {
    const LANES: usize = 4;

    #[inline(always)]
    unsafe fn load(slice: &[f32]) -> Self {
        unsafe { NeonBlock(vld1q_f32(slice.as_ptr())) }
    }

    #[inline(always)]
    unsafe fn store(self, slice: &mut [f32]) {
        unsafe { vst1q_f32(slice.as_mut_ptr(), self.0) }
    }
}

impl NeonBlock {
    /// `vrecpe`, then twice `x = x * (2 - a * x)` via `vrecps`.
    #[inline(always)]
    unsafe fn rcp(self) -> Self {
        unsafe {
            let a = self.0;
            let mut x = vrecpeq_f32(a);
            x = vmulq_f32(vrecpsq_f32(a, x), x);
            x = vmulq_f32(vrecpsq_f32(a, x), x);
            NeonBlock(x)
        }
    }

    /// `vrsqrte`, then twice `y = y * (3 - a * y^2) / 2` via `vrsqrts`.
    #[inline(always)]
    unsafe fn rsqrt(self) -> Self {
        unsafe {
            let a = self.0;
            let mut y = vrsqrteq_f32(a);
            y = vmulq_f32(vrsqrtsq_f32(vmulq_f32(a, y), y), y);
            y = vmulq_f32(vrsqrtsq_f32(vmulq_f32(a, y), y), y);
            NeonBlock(y)
        }
    }
}

pub(super) fn rcp_neon(input: &[f32], output: &mut [f32]) {
    // SAFETY: registered under the NEON requirement.
    unsafe { rcp_neon_impl(input, output) }
}

pub(super) fn rsqrt_neon(input: &[f32], output: &mut [f32]) {
    // SAFETY: registered under the NEON requirement.
    unsafe { rsqrt_neon_impl(input, output) }
}

#[target_feature(enable = "neon")]
unsafe fn rcp_neon_impl(input: &[f32], output: &mut [f32]) {
    let kernel = |v: NeonBlock| unsafe { v.rcp() };
    unsafe { process_unary(input, output, kernel, rcp_one) }
}

#[target_feature(enable = "neon")]
unsafe fn rsqrt_neon_impl(input: &[f32], output: &mut [f32]) {
    let kernel = |v: NeonBlock| unsafe { v.rsqrt() };
    unsafe { process_unary(input, output, kernel, rsqrt_one) }
}

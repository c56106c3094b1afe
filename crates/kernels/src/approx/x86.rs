//! SSE and AVX approximate kernels (x86/x86_64)
//!
//! The hardware estimates are good to about 12 bits; one Newton-Raphson step
//! brings them to within a few ULPs of the correctly rounded result.

#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

#[cfg(target_arch = "x86")]
use core::arch::x86::*;

use super::scalar::{rcp_one, rsqrt_one};
use crate::helpers::{process_unary, LaneBlock};

/// 4 lanes of f32 in an SSE register.
#[derive(Copy, Clone)]
#[repr(transparent)]
struct SseBlock(__m128);

impl LaneBlock for SseBlock {
    const LANES: usize = 4;

    #[inline(always)]
    unsafe fn load(slice: &[f32]) -> Self {
        unsafe { SseBlock(_mm_loadu_ps(slice.as_ptr())) }
    }

    #[inline(always)]
    unsafe fn store(self, slice: &mut [f32]) {
        unsafe { _mm_storeu_ps(slice.as_mut_ptr(), self.0) }
    }
}

impl SseBlock {
    /// `rcpps`, then `x1 = x0 * (2 - a * x0)`.
    #[inline(always)]
    unsafe fn rcp(self) -> Self {
        unsafe {
            let x0 = _mm_rcp_ps(self.0);
            let correction = _mm_sub_ps(_mm_set1_ps(2.0), _mm_mul_ps(self.0, x0));
            SseBlock(_mm_mul_ps(x0, correction))
        }
    }

    /// `rsqrtps`, then `y1 = y0 * (1.5 - 0.5 * a * y0^2)`.
    #[inline(always)]
    unsafe fn rsqrt(self) -> Self {
        unsafe {
            let y0 = _mm_rsqrt_ps(self.0);
            let half_a = _mm_mul_ps(_mm_set1_ps(0.5), self.0);
            let correction = _mm_sub_ps(_mm_set1_ps(1.5), _mm_mul_ps(half_a, _mm_mul_ps(y0, y0)));
            SseBlock(_mm_mul_ps(y0, correction))
        }
    }
}

/// 8 lanes of f32 in an AVX register.
#[derive(Copy, Clone)]
#[repr(transparent)]
struct AvxBlock(__m256);

impl LaneBlock for AvxBlock {
    const LANES: usize = 8;

    #[inline(always)]
    unsafe fn load(slice: &[f32]) -> Self {
        unsafe { AvxBlock(_mm256_loadu_ps(slice.as_ptr())) }
    }

    #[inline(always)]
    unsafe fn store(self, slice: &mut [f32]) {
        unsafe { _mm256_storeu_ps(slice.as_mut_ptr(), self.0) }
    }
}

impl AvxBlock {
    #[inline(always)]
    unsafe fn rcp(self) -> Self {
        unsafe {
            let x0 = _mm256_rcp_ps(self.0);
            let correction = _mm256_sub_ps(_mm256_set1_ps(2.0), _mm256_mul_ps(self.0, x0));
            AvxBlock(_mm256_mul_ps(x0, correction))
        }
    }

    #[inline(always)]
    unsafe fn rsqrt(self) -> Self {
        unsafe {
            let y0 = _mm256_rsqrt_ps(self.0);
            let half_a = _mm256_mul_ps(_mm256_set1_ps(0.5), self.0);
            let y0_sq = _mm256_mul_ps(y0, y0);
            let correction = _mm256_sub_ps(_mm256_set1_ps(1.5), _mm256_mul_ps(half_a, y0_sq));
            AvxBlock(_mm256_mul_ps(y0, correction))
        }
    }
}

// ============================================================================
// Registered entry points
// ============================================================================

pub(super) fn rcp_sse(input: &[f32], output: &mut [f32]) {
    // SAFETY: registered under the SSE2 requirement.
    unsafe { rcp_sse_impl(input, output) }
}

pub(super) fn rsqrt_sse(input: &[f32], output: &mut [f32]) {
    // SAFETY: registered under the SSE2 requirement.
    unsafe { rsqrt_sse_impl(input, output) }
}

pub(super) fn rcp_avx(input: &[f32], output: &mut [f32]) {
    // SAFETY: registered under the AVX requirement.
    unsafe { rcp_avx_impl(input, output) }
}

pub(super) fn rsqrt_avx(input: &[f32], output: &mut [f32]) {
    // SAFETY: registered under the AVX requirement.
    unsafe { rsqrt_avx_impl(input, output) }
}

#[target_feature(enable = "sse2")]
unsafe fn rcp_sse_impl(input: &[f32], output: &mut [f32]) {
    let kernel = |v: SseBlock| unsafe { v.rcp() };
    unsafe { process_unary(input, output, kernel, rcp_one) }
}

#[target_feature(enable = "sse2")]
unsafe fn rsqrt_sse_impl(input: &[f32], output: &mut [f32]) {
    let kernel = |v: SseBlock| unsafe { v.rsqrt() };
    unsafe { process_unary(input, output, kernel, rsqrt_one) }
}

#[target_feature(enable = "avx")]
unsafe fn rcp_avx_impl(input: &[f32], output: &mut [f32]) {
    let kernel = |v: AvxBlock| unsafe { v.rcp() };
    unsafe { process_unary(input, output, kernel, rcp_one) }
}

#[target_feature(enable = "avx")]
unsafe fn rsqrt_avx_impl(input: &[f32], output: &mut [f32]) {
    let kernel = |v: AvxBlock| unsafe { v.rsqrt() };
    unsafe { process_unary(input, output, kernel, rsqrt_one) }
}

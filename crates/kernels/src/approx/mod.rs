//! Approximate reciprocal and reciprocal square root.
//!
//! Unlike the exact kernels these are hand-written per instruction set, so
//! variants genuinely differ in their results:
//!
//! | variant    | requirement | method                                  |
//! |------------|-------------|-----------------------------------------|
//! | `baseline` | none        | `1 / x`, `1 / sqrt(x)` (correctly rounded) |
//! | `sse`      | SSE2        | `rcpps`/`rsqrtps` + one Newton-Raphson step |
//! | `avx`      | AVX         | 256-bit `vrcpps`/`vrsqrtps` + one step   |
//! | `neon`     | NEON        | `vrecpe`/`vrsqrte` + two steps           |
//!
//! Every accelerated variant stays within [`MAX_ULP`] of the correctly
//! rounded result for finite normal inputs with magnitude in
//! [`MIN_MAGNITUDE`, `MAX_MAGNITUDE`] (positive inputs for `rsqrt`).
//! Outside that range results are unspecified.

mod scalar;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86;

#[cfg(target_arch = "aarch64")]
mod neon;

use multiver_dispatch::{Dispatcher, RegistrationError, VariantRegistry};

#[cfg(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64"))]
use multiver_dispatch::Profile;

/// Signature shared by both operations.
pub type UnaryFn = fn(&[f32], &mut [f32]);

/// Error bound of the accelerated variants, in ULPs.
pub const MAX_ULP: u32 = 16;

/// Smallest input magnitude the error bound covers (2^-60).
pub const MIN_MAGNITUDE: f32 = f32::from_bits((127 - 60) << 23);

/// Largest input magnitude the error bound covers (2^60).
pub const MAX_MAGNITUDE: f32 = f32::from_bits((127 + 60) << 23);

pub static RCP: Dispatcher<UnaryFn> = Dispatcher::new("rcp_f32", rcp_registry);
pub static RSQRT: Dispatcher<UnaryFn> = Dispatcher::new("rsqrt_f32", rsqrt_registry);

/// Approximate reciprocal: `output[i] ≈ 1 / input[i]`
///
/// # Panics
/// If `input` and `output` differ in length.
#[inline]
pub fn rcp_f32(input: &[f32], output: &mut [f32]) {
    (RCP.get())(input, output)
}

/// Approximate reciprocal square root: `output[i] ≈ 1 / sqrt(input[i])`
///
/// # Panics
/// If `input` and `output` differ in length.
#[inline]
pub fn rsqrt_f32(input: &[f32], output: &mut [f32]) {
    (RSQRT.get())(input, output)
}

/// Documented error bound of a variant of either operation.
pub fn max_ulp_for(variant: &str) -> u32 {
    if variant == "baseline" {
        0
    } else {
        MAX_ULP
    }
}

fn rcp_registry() -> Result<VariantRegistry<UnaryFn>, RegistrationError> {
    let builder = VariantRegistry::builder("rcp_f32").baseline(scalar::rcp as UnaryFn);

    // SAFETY: each kernel uses only the instructions of the profile it is
    // registered under.
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    let builder = unsafe {
        builder
            .variant("sse", Profile::X86_SSE2.caps, x86::rcp_sse as UnaryFn)
            .variant("avx", Profile::X86_AVX.caps, x86::rcp_avx as UnaryFn)
    };

    // SAFETY: as above.
    #[cfg(target_arch = "aarch64")]
    let builder = unsafe { builder.variant("neon", Profile::ARM_NEON.caps, neon::rcp_neon as UnaryFn) };

    builder.build()
}

fn rsqrt_registry() -> Result<VariantRegistry<UnaryFn>, RegistrationError> {
    let builder = VariantRegistry::builder("rsqrt_f32").baseline(scalar::rsqrt as UnaryFn);

    // SAFETY: as for `rcp_registry`.
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    let builder = unsafe {
        builder
            .variant("sse", Profile::X86_SSE2.caps, x86::rsqrt_sse as UnaryFn)
            .variant("avx", Profile::X86_AVX.caps, x86::rsqrt_avx as UnaryFn)
    };

    // SAFETY: as above.
    #[cfg(target_arch = "aarch64")]
    let builder =
        unsafe { builder.variant("neon", Profile::ARM_NEON.caps, neon::rsqrt_neon as UnaryFn) };

    builder.build()
}

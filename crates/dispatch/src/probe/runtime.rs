//! Runtime feature detection provided by the ecosystem.
//!
//! - **x86/x86_64**: the `cpufeatures` crate, which also checks OS support
//!   for the AVX register state
//! - **aarch64**: `std::arch::is_aarch64_feature_detected!`

use super::ProbeTechnique;
use crate::caps::CapabilitySet;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86 {
    cpufeatures::new!(cpuid_sse2, "sse2");
    cpufeatures::new!(cpuid_sse3, "sse3");
    cpufeatures::new!(cpuid_ssse3, "ssse3");
    cpufeatures::new!(cpuid_sse41, "sse4.1");
    cpufeatures::new!(cpuid_avx, "avx");
    cpufeatures::new!(cpuid_avx2, "avx2");
    cpufeatures::new!(cpuid_fma, "fma");
    cpufeatures::new!(cpuid_avx512f, "avx512f");

    use crate::caps::CapabilitySet;

    pub(super) fn detect() -> CapabilitySet {
        let mut caps = CapabilitySet::empty();
        caps.set(CapabilitySet::X86_SSE2, cpuid_sse2::get());
        caps.set(CapabilitySet::X86_SSE3, cpuid_sse3::get());
        caps.set(CapabilitySet::X86_SSSE3, cpuid_ssse3::get());
        caps.set(CapabilitySet::X86_SSE4_1, cpuid_sse41::get());
        caps.set(CapabilitySet::X86_AVX, cpuid_avx::get());
        caps.set(CapabilitySet::X86_AVX2, cpuid_avx2::get());
        caps.set(CapabilitySet::X86_FMA3, cpuid_fma::get());
        caps.set(CapabilitySet::X86_AVX512F, cpuid_avx512f::get());
        caps
    }
}

/// Probe technique backed by the platform's runtime detection support.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeFeatures;

impl ProbeTechnique for RuntimeFeatures {
    fn name(&self) -> &'static str {
        "runtime"
    }

    fn probe(&self) -> Option<CapabilitySet> {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            Some(x86::detect())
        }

        #[cfg(target_arch = "aarch64")]
        {
            if std::arch::is_aarch64_feature_detected!("neon") {
                Some(CapabilitySet::ARM_NEON | CapabilitySet::ARM_NEON_FLT_SP)
            } else {
                Some(CapabilitySet::empty())
            }
        }

        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
        {
            None
        }
    }
}

//! Compilation Profiles
//!
//! A profile pairs the capability requirement a variant is registered under
//! with the `#[target_feature]` list it is compiled with. The two must agree:
//! compiling with features the requirement does not cover would let the
//! resolver hand out code the processor cannot run.
//!
//! The [`multiversion!`](crate::multiversion) macro compiles one variant per
//! entry of [`compiled_profiles`] plus the baseline.

use crate::caps::CapabilitySet;

/// One (requirement, target-feature list) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    /// Variant name reported in diagnostics.
    pub name: &'static str,
    /// Requirement the variant is registered under. Always consistent.
    pub caps: CapabilitySet,
    /// Comma separated rustc target features the variant is compiled with.
    pub target_features: &'static str,
}

const SSE3_CHAIN: CapabilitySet = CapabilitySet::X86_SSE2.union(CapabilitySet::X86_SSE3);
const SSSE3_CHAIN: CapabilitySet = SSE3_CHAIN.union(CapabilitySet::X86_SSSE3);
const SSE4_1_CHAIN: CapabilitySet = SSSE3_CHAIN.union(CapabilitySet::X86_SSE4_1);
const AVX_CHAIN: CapabilitySet = SSE4_1_CHAIN.union(CapabilitySet::X86_AVX);
const AVX2_CHAIN: CapabilitySet = AVX_CHAIN.union(CapabilitySet::X86_AVX2);
const AVX2_FMA_CHAIN: CapabilitySet = AVX2_CHAIN.union(CapabilitySet::X86_FMA3);
const AVX512F_CHAIN: CapabilitySet = AVX2_FMA_CHAIN.union(CapabilitySet::X86_AVX512F);

impl Profile {
    /// Capability-independent code; every registry has one.
    pub const BASELINE: Profile = Profile {
        name: "baseline",
        caps: CapabilitySet::BASELINE,
        target_features: "",
    };

    // ========================================================================
    // x86 / x86_64
    // ========================================================================

    pub const X86_SSE2: Profile = Profile {
        name: "sse2",
        caps: CapabilitySet::X86_SSE2,
        target_features: "sse2",
    };

    pub const X86_SSE3: Profile = Profile {
        name: "sse3",
        caps: SSE3_CHAIN,
        target_features: "sse2,sse3",
    };

    pub const X86_SSSE3: Profile = Profile {
        name: "ssse3",
        caps: SSSE3_CHAIN,
        target_features: "sse2,sse3,ssse3",
    };

    pub const X86_SSE4_1: Profile = Profile {
        name: "sse4.1",
        caps: SSE4_1_CHAIN,
        target_features: "sse2,sse3,ssse3,sse4.1",
    };

    pub const X86_AVX: Profile = Profile {
        name: "avx",
        caps: AVX_CHAIN,
        target_features: "sse2,sse3,ssse3,sse4.1,avx",
    };

    pub const X86_AVX2: Profile = Profile {
        name: "avx2",
        caps: AVX2_CHAIN,
        target_features: "sse2,sse3,ssse3,sse4.1,avx,avx2",
    };

    pub const X86_AVX2_FMA: Profile = Profile {
        name: "avx2+fma",
        caps: AVX2_FMA_CHAIN,
        target_features: "sse2,sse3,ssse3,sse4.1,avx,avx2,fma",
    };

    pub const X86_AVX512F: Profile = Profile {
        name: "avx512f",
        caps: AVX512F_CHAIN,
        target_features: "sse2,sse3,ssse3,sse4.1,avx,avx2,fma,avx512f",
    };

    // ========================================================================
    // aarch64
    // ========================================================================

    pub const ARM_NEON: Profile = Profile {
        name: "neon",
        caps: CapabilitySet::ARM_NEON,
        target_features: "neon",
    };
}

/// Profiles the macro compiles for the current target architecture, in
/// registration order. The baseline is not included.
///
/// SSE2 is part of the x86_64 baseline, so the `sse2` profile is compiled
/// for 32-bit x86 only.
pub fn compiled_profiles() -> &'static [Profile] {
    #[cfg(target_arch = "x86")]
    {
        &[
            Profile::X86_SSE2,
            Profile::X86_SSE3,
            Profile::X86_SSSE3,
            Profile::X86_SSE4_1,
            Profile::X86_AVX,
            Profile::X86_AVX2,
            Profile::X86_AVX2_FMA,
            Profile::X86_AVX512F,
        ]
    }

    #[cfg(target_arch = "x86_64")]
    {
        &[
            Profile::X86_SSE3,
            Profile::X86_SSSE3,
            Profile::X86_SSE4_1,
            Profile::X86_AVX,
            Profile::X86_AVX2,
            Profile::X86_AVX2_FMA,
            Profile::X86_AVX512F,
        ]
    }

    #[cfg(target_arch = "aarch64")]
    {
        &[Profile::ARM_NEON]
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
    {
        &[]
    }
}

//! Direct `CPUID` / `XGETBV` query (x86_64).

use super::ProbeTechnique;
use crate::caps::CapabilitySet;

/// XCR0 bits for SSE and AVX register state.
const XCR0_AVX_STATE: u64 = 0b110;
/// XCR0 bits for the AVX-512 opmask and upper ZMM state.
const XCR0_AVX512_STATE: u64 = 0b1110_0000;

/// Register values of the CPUID leaves the decoder looks at.
///
/// Kept separate from the instruction itself so decoding can be checked on
/// any host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuidLeaves {
    /// Highest standard leaf (leaf 0, EAX).
    pub max_leaf: u32,
    /// Leaf 1, ECX.
    pub leaf1_ecx: u32,
    /// Leaf 1, EDX.
    pub leaf1_edx: u32,
    /// Leaf 7 sub-leaf 0, EBX.
    pub leaf7_ebx: u32,
    /// Highest extended leaf (leaf 0x8000_0000, EAX).
    pub max_ext_leaf: u32,
    /// Leaf 0x8000_0001, ECX.
    pub ext1_ecx: u32,
    /// XCR0 when the OS enabled `XSAVE` (leaf 1 ECX bit 27), else `None`.
    pub xcr0: Option<u64>,
}

impl CpuidLeaves {
    /// Turn raw register values into a capability set.
    ///
    /// AVX-family bits are only reported when the OS saves the matching
    /// register state, otherwise executing those instructions would fault.
    pub fn decode(&self) -> CapabilitySet {
        let bit = |reg: u32, n: u32| reg & (1 << n) != 0;
        let mut caps = CapabilitySet::empty();

        let os_avx = self.xcr0.is_some_and(|x| x & XCR0_AVX_STATE == XCR0_AVX_STATE);
        let os_avx512 =
            os_avx && self.xcr0.is_some_and(|x| x & XCR0_AVX512_STATE == XCR0_AVX512_STATE);

        if self.max_leaf >= 1 {
            let (ecx, edx) = (self.leaf1_ecx, self.leaf1_edx);
            caps.set(CapabilitySet::X86_SSE2, bit(edx, 26));
            caps.set(CapabilitySet::X86_SSE3, bit(ecx, 0));
            caps.set(CapabilitySet::X86_SSSE3, bit(ecx, 9));
            caps.set(CapabilitySet::X86_SSE4_1, bit(ecx, 19));
            caps.set(CapabilitySet::X86_AVX, os_avx && bit(ecx, 28));
            caps.set(CapabilitySet::X86_FMA3, os_avx && bit(ecx, 12));
        }

        if self.max_leaf >= 7 {
            caps.set(CapabilitySet::X86_AVX2, os_avx && bit(self.leaf7_ebx, 5));
            caps.set(CapabilitySet::X86_AVX512F, os_avx512 && bit(self.leaf7_ebx, 16));
        }

        if self.max_ext_leaf >= 0x8000_0001 {
            caps.set(CapabilitySet::X86_FMA4, os_avx && bit(self.ext1_ecx, 16));
            caps.set(CapabilitySet::X86_XOP, os_avx && bit(self.ext1_ecx, 11));
        }

        caps
    }
}

/// Probe technique issuing `CPUID` directly. Unavailable off x86_64.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCpuid;

impl ProbeTechnique for RawCpuid {
    fn name(&self) -> &'static str {
        "cpuid"
    }

    fn probe(&self) -> Option<CapabilitySet> {
        #[cfg(target_arch = "x86_64")]
        {
            Some(read_leaves().decode())
        }

        #[cfg(not(target_arch = "x86_64"))]
        {
            None
        }
    }
}

#[cfg(target_arch = "x86_64")]
#[allow(unused_unsafe)]
fn read_leaves() -> CpuidLeaves {
    use std::arch::x86_64::{__cpuid, __cpuid_count};

    // SAFETY: CPUID is part of the x86_64 baseline.
    let leaf0 = unsafe { __cpuid(0) };
    let ext0 = unsafe { __cpuid(0x8000_0000) };
    let mut leaves = CpuidLeaves {
        max_leaf: leaf0.eax,
        max_ext_leaf: ext0.eax,
        ..CpuidLeaves::default()
    };

    if leaves.max_leaf >= 1 {
        let leaf1 = unsafe { __cpuid_count(1, 0) };
        leaves.leaf1_ecx = leaf1.ecx;
        leaves.leaf1_edx = leaf1.edx;
        if leaf1.ecx & (1 << 27) != 0 {
            // SAFETY: OSXSAVE set means XGETBV is enabled.
            leaves.xcr0 = Some(unsafe { xcr0() });
        }
    }
    if leaves.max_leaf >= 7 {
        leaves.leaf7_ebx = unsafe { __cpuid_count(7, 0) }.ebx;
    }
    if leaves.max_ext_leaf >= 0x8000_0001 {
        leaves.ext1_ecx = unsafe { __cpuid(0x8000_0001) }.ecx;
    }
    leaves
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "xsave")]
unsafe fn xcr0() -> u64 {
    std::arch::x86_64::_xgetbv(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SSE2: u32 = 1 << 26;
    const SSE3: u32 = 1 << 0;
    const SSSE3: u32 = 1 << 9;
    const SSE4_1: u32 = 1 << 19;
    const FMA: u32 = 1 << 12;
    const AVX: u32 = 1 << 28;

    fn haswell_like() -> CpuidLeaves {
        CpuidLeaves {
            max_leaf: 13,
            leaf1_ecx: SSE3 | SSSE3 | SSE4_1 | FMA | AVX | (1 << 27),
            leaf1_edx: SSE2,
            leaf7_ebx: 1 << 5,
            max_ext_leaf: 0x8000_0008,
            ext1_ecx: 0,
            xcr0: Some(0b111),
        }
    }

    #[test]
    fn test_decode_haswell() {
        let caps = haswell_like().decode();
        assert_eq!(caps, CapabilitySet::parse_implied("avx2,fma").unwrap());
        assert!(caps.is_consistent());
    }

    #[test]
    fn test_avx_requires_os_support() {
        let leaves = CpuidLeaves {
            xcr0: None,
            ..haswell_like()
        };
        let caps = leaves.decode();
        assert_eq!(caps, CapabilitySet::parse_implied("sse4.1").unwrap());
    }

    #[test]
    fn test_avx512_requires_zmm_state() {
        let mut leaves = haswell_like();
        leaves.leaf7_ebx |= 1 << 16;
        assert!(!leaves.decode().contains(CapabilitySet::X86_AVX512F));

        leaves.xcr0 = Some(0b1110_0111);
        assert!(leaves.decode().contains(CapabilitySet::X86_AVX512F));
    }

    #[test]
    fn test_low_max_leaf_ignores_leaf7() {
        let leaves = CpuidLeaves {
            max_leaf: 1,
            ..haswell_like()
        };
        assert!(!leaves.decode().contains(CapabilitySet::X86_AVX2));
    }

    #[test]
    fn test_amd_extended_leaf() {
        let leaves = CpuidLeaves {
            ext1_ecx: (1 << 16) | (1 << 11),
            ..haswell_like()
        };
        let caps = leaves.decode();
        assert!(caps.contains(CapabilitySet::X86_FMA4 | CapabilitySet::X86_XOP));
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_real_cpuid_reports_sse2() {
        let caps = RawCpuid.probe().unwrap();
        assert!(caps.contains(CapabilitySet::X86_SSE2));
    }
}

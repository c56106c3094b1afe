//! Capability Sets
//!
//! A [`CapabilitySet`] is a bit-vector over the instruction-set extensions this
//! crate knows how to detect. Sets are plain `Copy` values: the probe builds one,
//! variants declare one as their requirement, and the resolver compares them.
//!
//! Extensions are related by an implication table (AVX2 ⇒ AVX ⇒ SSE4.1 ⇒ SSSE3
//! ⇒ SSE3 ⇒ SSE2, ...). A set is *consistent* when it already contains
//! everything its members imply. Hardware never reports an inconsistent set,
//! so variants are not allowed to require one either.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseCapabilityError;

bitflags::bitflags! {
    /// Bit-vector of instruction-set extensions.
    ///
    /// The empty set is the baseline requirement: every processor satisfies it.
    ///
    /// # Example
    /// ```
    /// use multiver_dispatch::CapabilitySet;
    ///
    /// let avx2 = CapabilitySet::X86_AVX2.with_implied();
    /// assert!(CapabilitySet::X86_SSE4_1.is_subset_of(avx2));
    /// assert_eq!(avx2.specificity(), 6);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
    pub struct CapabilitySet: u32 {
        const X86_SSE2 = 1 << 0;
        const X86_SSE3 = 1 << 1;
        const X86_SSSE3 = 1 << 2;
        const X86_SSE4_1 = 1 << 3;
        const X86_AVX = 1 << 4;
        const X86_AVX2 = 1 << 5;
        const X86_FMA3 = 1 << 6;
        const X86_FMA4 = 1 << 7;
        const X86_XOP = 1 << 8;
        const X86_AVX512F = 1 << 9;
        const ARM_NEON = 1 << 10;
        const ARM_NEON_FLT_SP = 1 << 11;
        const POWER_ALTIVEC = 1 << 12;
    }
}

/// Direct implications: `(extension, what it implies)`.
///
/// Only one step is listed per row; [`CapabilitySet::with_implied`] computes
/// the transitive closure.
const IMPLICATIONS: &[(CapabilitySet, CapabilitySet)] = &[
    (CapabilitySet::X86_SSE3, CapabilitySet::X86_SSE2),
    (CapabilitySet::X86_SSSE3, CapabilitySet::X86_SSE3),
    (CapabilitySet::X86_SSE4_1, CapabilitySet::X86_SSSE3),
    (CapabilitySet::X86_AVX, CapabilitySet::X86_SSE4_1),
    (CapabilitySet::X86_AVX2, CapabilitySet::X86_AVX),
    // FMA3, FMA4 and XOP are VEX encoded and need the AVX register state.
    (CapabilitySet::X86_FMA3, CapabilitySet::X86_AVX),
    (CapabilitySet::X86_FMA4, CapabilitySet::X86_AVX),
    (CapabilitySet::X86_XOP, CapabilitySet::X86_AVX),
    (CapabilitySet::X86_AVX512F, CapabilitySet::X86_AVX2),
    (CapabilitySet::X86_AVX512F, CapabilitySet::X86_FMA3),
    (CapabilitySet::ARM_NEON_FLT_SP, CapabilitySet::ARM_NEON),
];

/// Lowercase identifiers used by `Display`, `FromStr` and the override
/// environment variables. The x86 names match rustc's target-feature names.
const ISA_NAMES: &[(CapabilitySet, &str)] = &[
    (CapabilitySet::X86_SSE2, "sse2"),
    (CapabilitySet::X86_SSE3, "sse3"),
    (CapabilitySet::X86_SSSE3, "ssse3"),
    (CapabilitySet::X86_SSE4_1, "sse4.1"),
    (CapabilitySet::X86_AVX, "avx"),
    (CapabilitySet::X86_AVX2, "avx2"),
    (CapabilitySet::X86_FMA3, "fma"),
    (CapabilitySet::X86_FMA4, "fma4"),
    (CapabilitySet::X86_XOP, "xop"),
    (CapabilitySet::X86_AVX512F, "avx512f"),
    (CapabilitySet::ARM_NEON, "neon"),
    (CapabilitySet::ARM_NEON_FLT_SP, "neonfltsp"),
    (CapabilitySet::POWER_ALTIVEC, "altivec"),
];

impl CapabilitySet {
    /// The empty requirement every processor satisfies.
    pub const BASELINE: Self = Self::empty();

    /// `true` if every bit of `self` is also in `other`.
    #[inline]
    pub const fn is_subset_of(self, other: Self) -> bool {
        self.bits() & !other.bits() == 0
    }

    /// Number of extensions in the set. Used only for ranking variants.
    #[inline]
    pub const fn specificity(self) -> u32 {
        self.bits().count_ones()
    }

    /// `true` if having every extension in `self` guarantees every extension
    /// in `other`.
    pub fn implies(self, other: Self) -> bool {
        other.is_subset_of(self.with_implied())
    }

    /// Closure of the set under the implication table.
    pub fn with_implied(self) -> Self {
        let mut closed = self;
        loop {
            let mut next = closed;
            for &(ext, implied) in IMPLICATIONS {
                if next.contains(ext) {
                    next |= implied;
                }
            }
            if next == closed {
                return closed;
            }
            closed = next;
        }
    }

    /// `true` if the set already contains everything its members imply.
    pub fn is_consistent(self) -> bool {
        self.with_implied() == self
    }

    /// Total order for sorting sets in listings: by specificity, then by raw
    /// bits.
    ///
    /// Returns `Ordering::Greater` when `self` has more extensions. This is
    /// not the resolver's tie-break: [`select_index`](crate::select_index)
    /// keeps the earlier declared of two equally specific variants.
    pub fn preference_cmp(&self, other: &Self) -> Ordering {
        self.specificity()
            .cmp(&other.specificity())
            .then_with(|| self.bits().cmp(&other.bits()))
    }

    /// Look up a single extension by its identifier (`"sse4.1"`, `"neon"`, ...).
    pub fn from_isa_name(name: &str) -> Option<Self> {
        ISA_NAMES
            .iter()
            .find(|(_, id)| *id == name)
            .map(|&(caps, _)| caps)
    }

    /// Parse a comma or whitespace separated list of identifiers into the
    /// exact bits named. `"none"` and the empty string give the baseline.
    pub fn parse_list(text: &str) -> Result<Self, ParseCapabilityError> {
        Self::parse_prefixed(text, "")
    }

    /// Like [`parse_list`](Self::parse_list), but each identifier may carry
    /// `prefix` (for example `"arch_"` in `arch_avx2`), which is stripped.
    pub fn parse_prefixed(text: &str, prefix: &str) -> Result<Self, ParseCapabilityError> {
        let mut caps = Self::empty();
        for token in text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let token = token.trim().to_ascii_lowercase();
            let name = token.strip_prefix(prefix).unwrap_or(&token);
            if name == "none" {
                continue;
            }
            caps |= Self::from_isa_name(name).ok_or_else(|| ParseCapabilityError::UnknownIsa {
                name: name.to_string(),
            })?;
        }
        Ok(caps)
    }

    /// Parse a list of identifiers and close it under the implication table,
    /// so `"avx2"` yields AVX2 together with everything it implies.
    pub fn parse_implied(text: &str) -> Result<Self, ParseCapabilityError> {
        Self::parse_list(text).map(Self::with_implied)
    }

    /// Extensions the current binary was compiled for.
    ///
    /// Any of these may be used unconditionally by non-multiversioned code,
    /// so the running processor is guaranteed to have them.
    pub fn compile_time() -> Self {
        let mut caps = Self::empty();
        let compiled = [
            (cfg!(target_feature = "sse2"), Self::X86_SSE2),
            (cfg!(target_feature = "sse3"), Self::X86_SSE3),
            (cfg!(target_feature = "ssse3"), Self::X86_SSSE3),
            (cfg!(target_feature = "sse4.1"), Self::X86_SSE4_1),
            (cfg!(target_feature = "avx"), Self::X86_AVX),
            (cfg!(target_feature = "avx2"), Self::X86_AVX2),
            (cfg!(target_feature = "fma"), Self::X86_FMA3),
            (cfg!(target_feature = "avx512f"), Self::X86_AVX512F),
            (cfg!(target_feature = "neon"), Self::ARM_NEON),
        ];
        for (enabled, ext) in compiled {
            if enabled {
                caps |= ext;
            }
        }
        // Every aarch64 NEON unit does single-precision float math.
        if cfg!(target_arch = "aarch64") && caps.contains(Self::ARM_NEON) {
            caps |= Self::ARM_NEON_FLT_SP;
        }
        caps
    }

    /// Identifiers of the extensions in the set, in bit order.
    pub fn isa_names(self) -> impl Iterator<Item = &'static str> {
        ISA_NAMES
            .iter()
            .filter(move |(ext, _)| self.contains(*ext))
            .map(|&(_, name)| name)
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (i, name) in self.isa_names().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

impl FromStr for CapabilitySet {
    type Err = ParseCapabilityError;

    /// Exact bits; use [`CapabilitySet::parse_implied`] for the closure.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_list(s)
    }
}

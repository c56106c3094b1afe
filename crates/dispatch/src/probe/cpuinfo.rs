//! `/proc/cpuinfo` parsing.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use super::ProbeTechnique;
use crate::caps::CapabilitySet;

/// Upper bound on how much of the report is read.
pub const MAX_REPORT_BYTES: u64 = 1 << 20;

const DEFAULT_PATH: &str = "/proc/cpuinfo";

/// Kernel flag names and the extension they announce. The kernel spells
/// SSE3 as `pni` and aarch64 Advanced SIMD as `asimd`.
const FLAG_NAMES: &[(&str, CapabilitySet)] = &[
    ("sse2", CapabilitySet::X86_SSE2),
    ("pni", CapabilitySet::X86_SSE3),
    ("ssse3", CapabilitySet::X86_SSSE3),
    ("sse4_1", CapabilitySet::X86_SSE4_1),
    ("avx", CapabilitySet::X86_AVX),
    ("avx2", CapabilitySet::X86_AVX2),
    ("fma", CapabilitySet::X86_FMA3),
    ("fma4", CapabilitySet::X86_FMA4),
    ("xop", CapabilitySet::X86_XOP),
    ("avx512f", CapabilitySet::X86_AVX512F),
    ("neon", CapabilitySet::ARM_NEON_FLT_SP),
    ("asimd", CapabilitySet::ARM_NEON_FLT_SP),
    ("altivec", CapabilitySet::POWER_ALTIVEC),
];

/// Probe technique reading the kernel's textual CPU report.
#[derive(Debug, Clone)]
pub struct ProcCpuinfo {
    path: PathBuf,
}

impl ProcCpuinfo {
    /// Read an alternate report file instead of `/proc/cpuinfo`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read at most [`MAX_REPORT_BYTES`]. Invalid UTF-8 (a vendor string,
    /// or a character cut at the size cap) is replaced rather than rejected.
    fn read_report(&self) -> std::io::Result<String> {
        let mut bytes = Vec::new();
        File::open(&self.path)?
            .take(MAX_REPORT_BYTES)
            .read_to_end(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Default for ProcCpuinfo {
    fn default() -> Self {
        Self::with_path(DEFAULT_PATH)
    }
}

impl ProbeTechnique for ProcCpuinfo {
    fn name(&self) -> &'static str {
        "proc-cpuinfo"
    }

    fn probe(&self) -> Option<CapabilitySet> {
        match self.read_report() {
            Ok(text) => Some(parse_cpuinfo(&text)),
            Err(err) => {
                tracing::debug!(path = %self.path.display(), error = %err, "cpu report unavailable");
                None
            }
        }
    }
}

/// Extract the capability set from the text of a cpuinfo report.
///
/// Looks at `flags` (x86), `Features` (ARM) and `cpu` (POWER, where the
/// model line mentions `altivec`). Each recognized name contributes its
/// extension together with everything it implies.
pub fn parse_cpuinfo(text: &str) -> CapabilitySet {
    let mut caps = CapabilitySet::empty();
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key != "flags" && key != "Features" && key != "cpu" {
            continue;
        }
        for word in value.split(|c: char| c.is_whitespace() || c == ',') {
            if let Some(&(_, ext)) = FLAG_NAMES.iter().find(|(name, _)| *name == word) {
                caps |= ext.with_implied();
            }
        }
    }
    caps
}

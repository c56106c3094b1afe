//! Capability Probe
//!
//! Detects which instruction-set extensions the running processor (and OS)
//! supports. Detection runs a chain of techniques in decreasing order of
//! trust and keeps the first non-empty answer:
//!
//! 1. [`RawCpuid`]: `CPUID` and `XGETBV` on x86_64
//! 2. [`RuntimeFeatures`]: `cpufeatures` on x86, `std::arch` detection on aarch64
//! 3. [`ProcCpuinfo`]: the `flags`/`Features` lines of `/proc/cpuinfo`
//!
//! If every technique fails the result is the empty set, which still resolves
//! every operation to its baseline. Probing never panics and never errors.
//!
//! The process-wide answer is computed once by [`detected`] and then fixed.
//! [`init_with_override`] installs a [`CapabilityOverride`] ahead of that.

mod cpuid;
mod cpuinfo;
mod runtime;

use std::sync::OnceLock;

use crate::caps::CapabilitySet;
use crate::config::CapabilityOverride;
use crate::error::AlreadyInitialized;

pub use cpuid::{CpuidLeaves, RawCpuid};
pub use cpuinfo::{parse_cpuinfo, ProcCpuinfo, MAX_REPORT_BYTES};
pub use runtime::RuntimeFeatures;

/// One way of asking the hardware or OS what it supports.
///
/// Returns `None` when the technique is unavailable on this platform or the
/// query fails. An answer of `Some(empty)` counts as a failure too, so the
/// next technique gets a chance.
pub trait ProbeTechnique: Send + Sync {
    /// Short name for logs and reports.
    fn name(&self) -> &'static str;

    fn probe(&self) -> Option<CapabilitySet>;
}

/// Outcome of one detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionReport {
    /// What the winning technique reported, before overrides.
    pub probed: CapabilitySet,
    /// Name of the winning technique, `None` if every technique failed or
    /// probing was disabled.
    pub technique: Option<&'static str>,
    /// Override applied on top of `probed`.
    pub overrides: CapabilityOverride,
    /// Final set the resolver sees.
    pub detected: CapabilitySet,
}

impl DetectionReport {
    fn fixed(caps: CapabilitySet, technique: &'static str) -> Self {
        Self {
            probed: caps,
            technique: Some(technique),
            overrides: CapabilityOverride::NONE,
            detected: caps,
        }
    }
}

/// An ordered chain of probe techniques plus an override.
pub struct Probe {
    techniques: Vec<Box<dyn ProbeTechnique>>,
    overrides: CapabilityOverride,
}

impl Probe {
    /// A probe with no techniques; it always reports the override alone.
    pub fn new() -> Self {
        Self {
            techniques: Vec::new(),
            overrides: CapabilityOverride::NONE,
        }
    }

    /// The standard chain: [`RawCpuid`], [`RuntimeFeatures`], [`ProcCpuinfo`].
    pub fn standard() -> Self {
        Self::new()
            .technique(RawCpuid)
            .technique(RuntimeFeatures)
            .technique(ProcCpuinfo::default())
    }

    /// Append a technique at the lowest preference.
    pub fn technique(mut self, technique: impl ProbeTechnique + 'static) -> Self {
        self.techniques.push(Box::new(technique));
        self
    }

    pub fn with_override(mut self, overrides: CapabilityOverride) -> Self {
        self.overrides = overrides;
        self
    }

    /// Names of the techniques in preference order.
    pub fn technique_names(&self) -> Vec<&'static str> {
        self.techniques.iter().map(|t| t.name()).collect()
    }

    /// Run the chain and apply the override.
    pub fn run(&self) -> DetectionReport {
        let mut winner = None;
        for technique in &self.techniques {
            let result = technique.probe();
            tracing::debug!(technique = technique.name(), result = ?result, "probe technique finished");
            match result {
                Some(caps) if !caps.is_empty() => {
                    winner = Some((technique.name(), caps));
                    break;
                }
                _ => continue,
            }
        }

        let (technique, probed) = match winner {
            Some((name, caps)) => (Some(name), caps),
            None => {
                tracing::debug!("no probe technique produced a result; assuming baseline only");
                (None, CapabilitySet::empty())
            }
        };

        DetectionReport {
            probed,
            technique,
            overrides: self.overrides,
            detected: self.overrides.apply(probed),
        }
    }

    /// Shorthand for `self.run().detected`.
    pub fn detect(&self) -> CapabilitySet {
        self.run().detected
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Probe")
            .field("techniques", &self.technique_names())
            .field("overrides", &self.overrides)
            .finish()
    }
}

// ============================================================================
// Process-wide detection
// ============================================================================

static DETECTION: OnceLock<DetectionReport> = OnceLock::new();

/// Run the default detection without caching.
///
/// Honors the cargo features and the override environment variables exactly
/// like [`detected`], but probes again on every call.
pub fn detect() -> CapabilitySet {
    default_detection().detected
}

/// The process-wide detected set. Probes on first call, cached afterwards.
#[inline]
pub fn detected() -> CapabilitySet {
    detection_report().detected
}

/// Full report behind [`detected`].
pub fn detection_report() -> &'static DetectionReport {
    DETECTION.get_or_init(|| {
        let report = default_detection();
        log_detection(&report);
        report
    })
}

/// Fix the process-wide set using the standard probe and `overrides`
/// instead of the environment.
///
/// Fails once detection has already happened, including implicitly through
/// the first dispatched call.
pub fn init_with_override(
    overrides: CapabilityOverride,
) -> Result<&'static DetectionReport, AlreadyInitialized> {
    init_with_probe(&Probe::standard().with_override(overrides))
}

/// Fix the process-wide set by running `probe`.
pub fn init_with_probe(probe: &Probe) -> Result<&'static DetectionReport, AlreadyInitialized> {
    let mut initialized_here = false;
    let report = DETECTION.get_or_init(|| {
        initialized_here = true;
        let report = probe.run();
        log_detection(&report);
        report
    });

    if initialized_here {
        Ok(report)
    } else {
        Err(AlreadyInitialized)
    }
}

fn default_detection() -> DetectionReport {
    detection_for(
        cfg!(feature = "force-baseline"),
        cfg!(feature = "runtime-dispatch"),
    )
}

/// Detection as configured by the cargo features, taken as arguments so
/// every combination is reachable from one build.
fn detection_for(force_baseline: bool, runtime_dispatch: bool) -> DetectionReport {
    if force_baseline {
        return DetectionReport::fixed(CapabilitySet::empty(), "force-baseline");
    }
    if !runtime_dispatch {
        return DetectionReport::fixed(CapabilitySet::compile_time(), "compile-time");
    }
    Probe::standard()
        .with_override(CapabilityOverride::from_env())
        .run()
}

fn log_detection(report: &DetectionReport) {
    tracing::info!(
        detected = %report.detected,
        technique = report.technique.unwrap_or("none"),
        overridden = !report.overrides.is_empty(),
        "capabilities detected"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, Option<CapabilitySet>);

    impl ProbeTechnique for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        fn probe(&self) -> Option<CapabilitySet> {
            self.1
        }
    }

    #[test]
    fn test_first_non_empty_technique_wins() {
        let probe = Probe::new()
            .technique(Fixed("broken", None))
            .technique(Fixed("empty", Some(CapabilitySet::empty())))
            .technique(Fixed("second", Some(CapabilitySet::X86_SSE2)))
            .technique(Fixed("third", Some(CapabilitySet::ARM_NEON)));

        let report = probe.run();
        assert_eq!(report.technique, Some("second"));
        assert_eq!(report.detected, CapabilitySet::X86_SSE2);
    }

    #[test]
    fn test_all_techniques_failing_gives_baseline() {
        let probe = Probe::new().technique(Fixed("broken", None));
        let report = probe.run();
        assert_eq!(report.technique, None);
        assert!(report.detected.is_empty());
    }

    #[test]
    fn test_override_applies_after_probe() {
        let probe = Probe::new()
            .technique(Fixed("hw", Some(CapabilitySet::X86_SSE2)))
            .with_override(CapabilityOverride::new(
                CapabilitySet::empty(),
                CapabilitySet::X86_SSE2,
            ));
        let report = probe.run();
        assert_eq!(report.probed, CapabilitySet::X86_SSE2);
        assert!(report.detected.is_empty());
    }

    #[test]
    fn test_standard_chain_order() {
        assert_eq!(
            Probe::standard().technique_names(),
            vec!["cpuid", "runtime", "proc-cpuinfo"]
        );
    }

    #[test]
    fn test_force_baseline_detects_nothing() {
        for runtime_dispatch in [true, false] {
            let report = detection_for(true, runtime_dispatch);
            assert!(report.detected.is_empty());
            assert!(report.probed.is_empty());
            assert_eq!(report.technique, Some("force-baseline"));
            assert!(report.overrides.is_empty());
        }
    }

    #[test]
    fn test_without_runtime_dispatch_uses_compile_time_set() {
        let report = detection_for(false, false);
        assert_eq!(report.detected, CapabilitySet::compile_time());
        assert_eq!(report.technique, Some("compile-time"));
        assert!(report.overrides.is_empty());
    }

    #[test]
    fn test_default_detection_follows_enabled_features() {
        let report = default_detection();
        if cfg!(feature = "force-baseline") {
            assert_eq!(report.technique, Some("force-baseline"));
        } else if !cfg!(feature = "runtime-dispatch") {
            assert_eq!(report.technique, Some("compile-time"));
        } else {
            assert_ne!(report.technique, Some("force-baseline"));
            assert_ne!(report.technique, Some("compile-time"));
        }
    }

    #[test]
    fn test_standard_probe_is_idempotent() {
        let probe = Probe::standard();
        assert_eq!(probe.detect(), probe.detect());
    }
}

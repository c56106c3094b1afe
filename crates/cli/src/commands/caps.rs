//! `multiver caps`: the detected capability set and where it came from.

use anyhow::Result;
use multiver_dispatch::probe::{ProcCpuinfo, RawCpuid, RuntimeFeatures};
use multiver_dispatch::{compiled_profiles, detection_report, CapabilitySet, ProbeTechnique, Profile};

pub fn execute() -> Result<()> {
    let report = detection_report();

    println!("detected:     {}", report.detected);
    println!("technique:    {}", report.technique.unwrap_or("none"));
    println!("probed:       {}", report.probed);
    println!("forced on:    {}", report.overrides.forced_supported);
    println!("forced off:   {}", report.overrides.forced_unsupported);
    println!("compile-time: {}", CapabilitySet::compile_time());

    println!();
    println!("techniques:");
    let techniques: [&dyn ProbeTechnique; 3] = [&RawCpuid, &RuntimeFeatures, &ProcCpuinfo::default()];
    for technique in techniques {
        let result = match technique.probe() {
            Some(caps) if !caps.is_empty() => caps.to_string(),
            _ => "unavailable".to_string(),
        };
        println!("  {:<14} {}", technique.name(), result);
    }

    println!();
    println!("profiles:");
    for profile in std::iter::once(&Profile::BASELINE).chain(compiled_profiles()) {
        let mark = if profile.caps.is_subset_of(report.detected) { "x" } else { " " };
        println!("  [{mark}] {:<10} {}", profile.name, profile.caps);
    }

    Ok(())
}

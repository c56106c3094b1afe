//! Probe chain tests: technique fallback, overrides and the bounded
//! `/proc/cpuinfo` read.


use std::io::Write;

use multiver_dispatch::probe::{ProcCpuinfo, MAX_REPORT_BYTES};
use multiver_dispatch::{resolve, CapabilityOverride, CapabilitySet, Probe, ProbeTechnique};
use test_utils::*;

const A: CapabilitySet = CapabilitySet::X86_SSE2;

#[test]
fn test_second_technique_used_when_first_fails() {
    let probe = Probe::new()
        .technique(FixedTechnique::failing("first"))
        .technique(FixedTechnique::reporting("second", A));

    let report = probe.run();
    assert_eq!(report.detected, A);
    assert_eq!(report.technique, Some("second"));
}

#[test]
fn test_every_technique_failing_resolves_to_baseline() {
    let probe = Probe::new()
        .technique(FixedTechnique::failing("first"))
        .technique(FixedTechnique::reporting("second", CapabilitySet::empty()));

    let detected = probe.detect();
    assert!(detected.is_empty());
    assert_eq!(resolve(&all_profiles_registry(), detected).name(), "baseline");
}

#[test]
fn test_forced_unsupported_hides_hardware_bit() {
    let probe = Probe::new()
        .technique(FixedTechnique::reporting("hw", A))
        .with_override(CapabilityOverride::new(CapabilitySet::empty(), A));

    let report = probe.run();
    assert_eq!(report.probed, A);
    assert!(report.detected.is_empty());

    let registry = named_registry("op", &[("a", A)]).unwrap();
    assert_eq!(resolve(&registry, report.detected).name(), "baseline");
}

#[test]
fn test_forced_supported_adds_implied_bits() {
    let overrides = CapabilityOverride::parse(Some("sse4.1"), None).unwrap();
    let probe = Probe::new()
        .technique(FixedTechnique::reporting("hw", A))
        .with_override(overrides);

    let detected = probe.detect();
    assert_eq!(detected, CapabilitySet::parse_implied("sse4.1").unwrap());
    assert_eq!(resolve(&all_profiles_registry(), detected).name(), "sse4.1");
}

#[test]
fn test_cpuinfo_file_is_parsed() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "processor\t: 0").unwrap();
    writeln!(file, "flags\t\t: fpu sse sse2 pni ssse3 sse4_1").unwrap();

    let technique = ProcCpuinfo::with_path(file.path());
    assert_eq!(
        technique.probe(),
        Some(CapabilitySet::parse_implied("sse4.1").unwrap())
    );
}

#[test]
fn test_cpuinfo_read_is_bounded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let filler = vec![b'x'; MAX_REPORT_BYTES as usize];
    file.write_all(&filler).unwrap();
    writeln!(file).unwrap();
    writeln!(file, "flags\t\t: sse2 avx2").unwrap();

    // The flags line sits past the read limit, so nothing is found and the
    // chain moves on to the next technique.
    let probe = Probe::new()
        .technique(ProcCpuinfo::with_path(file.path()))
        .technique(FixedTechnique::reporting("fallback", A));
    let report = probe.run();
    assert_eq!(report.technique, Some("fallback"));
    assert_eq!(report.detected, A);
}

#[test]
fn test_cpuinfo_with_non_utf8_model_name_is_parsed() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"model name\t: Caf\xe9 CPU\nflags\t\t: sse2 pni avx\n")
        .unwrap();

    let caps = ProcCpuinfo::with_path(file.path()).probe();
    assert_eq!(caps, Some(CapabilitySet::parse_implied("sse2,sse3,avx").unwrap()));
}

#[test]
fn test_cpuinfo_cut_inside_multibyte_character_is_parsed() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let flags = b"flags\t\t: sse2 pni avx\n";
    let mut report = flags.to_vec();
    report.extend_from_slice(b"model name\t: ");
    // Place the two bytes of `é` on either side of the read limit.
    report.resize(MAX_REPORT_BYTES as usize - 1, b'x');
    report.extend_from_slice("é CPU\n".as_bytes());
    file.write_all(&report).unwrap();

    let caps = ProcCpuinfo::with_path(file.path()).probe();
    assert_eq!(caps, Some(CapabilitySet::parse_implied("sse2,sse3,avx").unwrap()));
}

#[test]
fn test_standard_probe_is_deterministic() {
    let first = Probe::standard().run();
    let second = Probe::standard().run();
    assert_eq!(first, second);

    #[cfg(target_arch = "x86_64")]
    {
        assert_eq!(first.technique, Some("cpuid"));
        assert!(first.detected.contains(CapabilitySet::X86_SSE2));
    }
}

//! Integration tests for the `multiver` binary.

use std::process::{Command, Output};

/// Every extension name, for masking the processor down to the baseline.
const ALL_EXTENSIONS: &str = "sse2,sse3,ssse3,sse4.1,avx,avx2,fma,fma4,xop,avx512f,neon,neonfltsp,altivec";

fn multiver(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_multiver"))
        .args(args)
        .env_remove("MULTIVER_FORCE_SUPPORTED")
        .env_remove("MULTIVER_FORCE_UNSUPPORTED")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run multiver")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_caps_reports_detection() {
    let output = multiver(&["caps"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    assert!(text.contains("detected:"));
    assert!(text.contains("techniques:"));
    assert!(text.contains("proc-cpuinfo"));
    assert!(text.contains("[x] baseline"));
}

#[test]
fn test_caps_with_everything_forced_off() {
    let output = multiver(&["--force-unsupported", ALL_EXTENSIONS, "caps"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).lines().any(|l| l == "detected:     none"));
}

#[test]
fn test_forced_supported_is_closed_under_implication() {
    let output = multiver(&["--force-supported", "ssse3", "caps"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    let forced = text
        .lines()
        .find(|l| l.starts_with("forced on:"))
        .expect("forced on line");
    assert!(forced.contains("sse2") && forced.contains("sse3") && forced.contains("ssse3"), "{forced}");
}

#[test]
fn test_variants_resolve_to_baseline_when_masked() {
    let output = multiver(&["--force-unsupported", ALL_EXTENSIONS, "variants", "--op", "add_f32"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    assert!(text.starts_with("add_f32 -> baseline"), "{text}");
    assert!(text.contains("* baseline"));
}

#[test]
fn test_variants_listed_most_specific_first() {
    let output = multiver(&["variants", "--op", "add_f32"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    let names: Vec<&str> = text
        .lines()
        .skip(1)
        .filter_map(|l| l.get(4..))
        .filter_map(|l| l.split_whitespace().next())
        .collect();
    assert_eq!(names.last(), Some(&"baseline"), "{text}");
    if cfg!(target_arch = "x86_64") {
        assert_eq!(names.first(), Some(&"avx512f"), "{text}");
    }
}

#[test]
fn test_variants_lists_every_operation() {
    let output = multiver(&["variants"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    for op in ["add_f32", "cmp_eq_f32", "not_u32x4", "rcp_f32", "rsqrt_f32"] {
        assert!(text.contains(&format!("{op} -> ")), "missing {op}");
    }
}

#[test]
fn test_unknown_operation_fails() {
    let output = multiver(&["variants", "--op", "nope"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown operation `nope`"));
}

#[test]
fn test_unknown_extension_fails() {
    let output = multiver(&["--force-unsupported", "sse9", "caps"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown instruction-set extension `sse9`"));
}

#[test]
fn test_check_passes() {
    let output = multiver(&["check", "--all"]);
    assert!(output.status.success(), "stdout: {}\nstderr: {}", stdout(&output), stderr(&output));

    let text = stdout(&output);
    assert!(text.contains("ok   add_f32      baseline"));
    assert!(text.contains("variants consistent"));
}

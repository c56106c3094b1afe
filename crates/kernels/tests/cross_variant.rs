//! Every supported variant must agree with the baseline.


use multiver_dispatch::detected;
use multiver_kernels::{check_all, lane_ops, ops, F32x4};
use test_utils::same_bits;

#[test]
fn test_add_example_on_every_variant() {
    let a = [1.0, 2.0, 3.0, 4.0];
    let b = [4.0, 3.0, 2.0, 1.0];

    let lane_variants = lane_ops::add_f32x4::DISPATCHER.variants();
    assert!(lane_variants.iter().any(|v| v.is_baseline()));
    for variant in lane_variants {
        let Some(f) = variant.func_if_supported() else {
            continue;
        };
        assert_eq!(f(F32x4::from(a), F32x4::from(b)), F32x4::splat(5.0), "{}", variant.name());
    }

    for variant in ops::add_f32::DISPATCHER.variants() {
        let Some(f) = variant.func_if_supported() else {
            continue;
        };
        let mut out = [0.0; 4];
        f(&a, &b, &mut out);
        assert_eq!(out, [5.0; 4], "{}", variant.name());
    }
}

#[test]
fn test_unsupported_variants_are_withheld() {
    let caps = detected();
    for variant in ops::mul_f32::DISPATCHER.variants() {
        assert_eq!(variant.func_if_supported().is_some(), variant.is_supported_by(caps));
    }
}

#[test]
fn test_check_all_passes() {
    let checks = check_all();
    assert!(!checks.is_empty());

    let failures: Vec<_> = checks.iter().filter(|c| !c.passed()).collect();
    assert!(failures.is_empty(), "variants deviating from baseline: {failures:#?}");

    for check in &checks {
        assert!(check.required.is_subset_of(detected()), "{check:?}");
    }
}

#[test]
fn test_remainder_lengths_match_baseline() {
    // Lengths around every block size the profiles use.
    for len in [0, 1, 3, 4, 5, 7, 8, 9, 15, 16, 17, 31, 33] {
        let a: Vec<f32> = (0..len).map(|i| i as f32 * 0.75 - 3.0).collect();
        let b: Vec<f32> = (0..len).map(|i| 2.0 - i as f32 * 0.5).collect();

        let baseline = ops::fma_f32::DISPATCHER.resolution().registry().baseline();
        // SAFETY: the baseline has no requirement.
        let base = unsafe { baseline.func_unchecked() };
        let mut want = vec![0.0; len];
        base(&a, &b, &a, &mut want);

        let mut got = vec![0.0; len];
        ops::fma_f32(&a, &b, &a, &mut got);
        assert!(same_bits(&got, &want), "len {len}: {got:?} vs {want:?}");
    }
}

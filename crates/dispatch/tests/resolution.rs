//! Resolution Integration Tests
//!
//! These tests verify variant selection end to end:
//! 1. The resolver against simulated processors
//! 2. `Dispatcher` caching with a caller-supplied capability source
//! 3. Functions declared through `multiversion!`


use multiver_dispatch::{
    compiled_profiles, detected, multiversion, resolve, CapabilitySet, Dispatcher, OperationInfo,
    RegistrationError, VariantRegistry,
};
use test_utils::*;

const A: CapabilitySet = CapabilitySet::X86_SSE2;
const B: CapabilitySet = CapabilitySet::X86_SSE3;

multiversion! {
    /// Dot product, declared once and compiled per profile.
    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    fn fill(value: u32, output: &mut [u32]) {
        for o in output.iter_mut() {
            *o = value;
        }
    }
}

#[cfg(test)]
mod resolver_tests {
    use super::*;

    #[test]
    fn test_partial_support_picks_partial_variant() {
        let registry = named_registry("op", &[("a", A), ("ab", A | B)]).unwrap();
        assert_eq!(resolve(&registry, A).name(), "a");
    }

    #[test]
    fn test_empty_detected_set_picks_baseline() {
        let registry = all_profiles_registry();
        assert_eq!(resolve(&registry, CapabilitySet::empty()).name(), "baseline");
    }

    #[test]
    fn test_more_specific_variant_wins() {
        let registry = all_profiles_registry();
        let haswell = CapabilitySet::parse_implied("avx2,fma").unwrap();
        assert_eq!(resolve(&registry, haswell).name(), "avx2+fma");

        let sandy_bridge = CapabilitySet::parse_implied("avx").unwrap();
        assert_eq!(resolve(&registry, sandy_bridge).name(), "avx");

        let arm = CapabilitySet::parse_implied("neonfltsp").unwrap();
        assert_eq!(resolve(&registry, arm).name(), "neon");
    }

    #[test]
    fn test_forced_unsupported_behaves_as_absent() {
        let registry = named_registry("op", &[("a", A)]).unwrap();
        let overrides = multiver_dispatch::CapabilityOverride::new(CapabilitySet::empty(), A);
        let detected = overrides.apply(A);
        assert_eq!(resolve(&registry, detected).name(), "baseline");
    }

    #[test]
    fn test_resolving_twice_gives_identical_callable() {
        let registry = all_profiles_registry();
        let caps = CapabilitySet::parse_implied("sse4.1").unwrap();
        let first = resolve(&registry, caps);
        let second = resolve(&registry, caps);
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.name(), "sse4.1");
    }

    #[test]
    fn test_registration_errors_surface_from_build() {
        let err = named_registry("op", &[("dup", A), ("dup-again", A)]).unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateRequirement { .. }));

        let err = named_registry("op", &[("avx2-only", CapabilitySet::X86_AVX2)]).unwrap_err();
        assert!(matches!(err, RegistrationError::InconsistentRequirement { .. }));
    }
}

#[cfg(test)]
mod dispatcher_tests {
    use super::*;

    fn sse3_machine() -> CapabilitySet {
        A | B
    }

    fn build() -> Result<VariantRegistry<NamedOp>, RegistrationError> {
        named_registry("simulated", &[("a", A), ("ab", A | B)])
    }

    static SIMULATED: Dispatcher<NamedOp> =
        Dispatcher::with_arch_info("simulated", build, sse3_machine);

    #[test]
    fn test_dispatcher_uses_supplied_capabilities() {
        assert_eq!(SIMULATED.resolved().name(), "ab");
        assert_eq!(SIMULATED.variants().len(), 3);
        assert_eq!((SIMULATED.get())(), 0);
        assert!(SIMULATED.is_resolved());
    }

    #[test]
    fn test_dispatchers_list_through_operation_info() {
        let ops: [&dyn OperationInfo; 2] = [&dot::DISPATCHER, &SIMULATED];
        let names: Vec<_> = ops.iter().map(|op| op.operation()).collect();
        assert_eq!(names, ["dot", "simulated"]);
    }
}

#[cfg(test)]
mod macro_tests {
    use super::*;

    #[test]
    fn test_multiversioned_function_computes_body() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [4.0, 3.0, 2.0, 1.0];
        assert_eq!(dot(&a, &b), 20.0);

        let mut out = [0u32; 7];
        fill(9, &mut out);
        assert_eq!(out, [9; 7]);
    }

    #[test]
    fn test_macro_registers_every_compiled_profile() {
        let names: Vec<_> = dot::DISPATCHER.variants().iter().map(|v| v.name()).collect();
        let mut expected = vec!["baseline"];
        expected.extend(compiled_profiles().iter().map(|p| p.name));
        assert_eq!(names, expected);
    }

    #[test]
    #[cfg(target_arch = "x86_64")]
    fn test_sse2_copy_is_not_compiled_on_x86_64() {
        let names: Vec<_> = dot::DISPATCHER.variants().iter().map(|v| v.name()).collect();
        assert!(!names.contains(&"sse2"), "{names:?}");
        assert_eq!(names[1], "sse3");
    }

    #[test]
    fn test_profile_entries_forward_to_their_body() {
        // Each registered pointer is the safe wrapper of one profile copy.
        for variant in fill::DISPATCHER.variants() {
            let Some(f) = variant.func_if_supported() else {
                continue;
            };
            let mut out = [0u32; 19];
            f(variant.required().bits(), &mut out);
            assert!(out.iter().all(|&x| x == variant.required().bits()), "{}", variant.name());
        }
    }

    #[test]
    fn test_macro_never_selects_unsupported_variant() {
        let chosen = fill::DISPATCHER.resolved();
        assert!(chosen.is_supported_by(detected()));
        assert!(chosen.required().is_subset_of(detected()));
    }

    #[test]
    fn test_every_supported_variant_agrees_with_baseline() {
        let a: Vec<f32> = (0..37).map(|i| i as f32 * 0.25).collect();
        let b: Vec<f32> = (0..37).map(|i| 8.0 - i as f32).collect();

        let baseline = dot::DISPATCHER.variants()[0]
            .func_if_supported()
            .expect("baseline always runs");
        let expected = baseline(&a, &b);

        for variant in dot::DISPATCHER.variants() {
            if let Some(f) = variant.func_if_supported() {
                // The reduction order may differ between vector widths.
                let got = f(&a, &b);
                assert!(
                    (got - expected).abs() <= expected.abs() * 1e-5,
                    "{}: {got} vs {expected}",
                    variant.name()
                );
            }
        }
    }
}

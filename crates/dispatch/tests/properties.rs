//! Property-based tests for capability algebra and resolution.


use std::cmp::Ordering;

use multiver_dispatch::{resolve, CapabilitySet};
use proptest::prelude::*;
use test_utils::*;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 10_000,
        ..ProptestConfig::default()
    })]

    // ========================================================================
    // Algebra
    // ========================================================================

    #[test]
    fn prop_union_is_commutative_and_covering(a in any_caps(), b in any_caps()) {
        prop_assert_eq!(a.union(b), b.union(a));
        prop_assert!(a.is_subset_of(a.union(b)));
        prop_assert!(b.is_subset_of(a.union(b)));
    }

    #[test]
    fn prop_subset_matches_union(a in any_caps(), b in any_caps()) {
        prop_assert_eq!(a.is_subset_of(b), a.union(b) == b);
    }

    #[test]
    fn prop_specificity_is_monotonic(a in any_caps(), b in any_caps()) {
        if a.is_subset_of(b) {
            prop_assert!(a.specificity() <= b.specificity());
        }
    }

    #[test]
    fn prop_closure_is_idempotent_superset(a in any_caps()) {
        let closed = a.with_implied();
        prop_assert!(a.is_subset_of(closed));
        prop_assert_eq!(closed.with_implied(), closed);
        prop_assert!(closed.is_consistent());
        prop_assert!(closed.implies(a));
    }

    #[test]
    fn prop_consistent_sets_imply_only_their_subsets(a in consistent_caps(), b in any_caps()) {
        prop_assert_eq!(a.implies(b), b.is_subset_of(a));
    }

    #[test]
    fn prop_preference_is_a_total_order(a in any_caps(), b in any_caps()) {
        let forward = a.preference_cmp(&b);
        prop_assert_eq!(forward, b.preference_cmp(&a).reverse());
        prop_assert_eq!(forward == Ordering::Equal, a == b);
    }

    #[test]
    fn prop_display_parses_back(a in any_caps()) {
        let parsed: CapabilitySet = a.to_string().parse().unwrap();
        prop_assert_eq!(parsed, a);
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    #[test]
    fn prop_resolved_variant_is_supported(detected in any_caps()) {
        let registry = all_profiles_registry();
        let chosen = resolve(&registry, detected);
        prop_assert!(chosen.required().is_subset_of(detected));
    }

    #[test]
    fn prop_resolved_variant_is_maximal(detected in any_caps()) {
        let registry = all_profiles_registry();
        let chosen = resolve(&registry, detected);
        for variant in registry.variants() {
            if variant.is_supported_by(detected) {
                prop_assert!(variant.required().specificity() <= chosen.required().specificity());
            }
        }
    }

    #[test]
    fn prop_more_capabilities_never_pick_less(a in consistent_caps(), extra in any_caps()) {
        let registry = all_profiles_registry();
        let smaller = resolve(&registry, a);
        let larger = resolve(&registry, a.union(extra));
        prop_assert!(smaller.required().specificity() <= larger.required().specificity());
    }
}

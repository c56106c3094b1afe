//! Resolver
//!
//! Picks the variant to run for a given capability set. Selection is a pure
//! function of `(registry, detected)`; caching lives in
//! [`Dispatcher`](crate::Dispatcher).
//!
//! Rules:
//! - only variants whose requirement ⊆ `detected` are candidates
//! - the candidate with the most extensions wins
//! - among equally specific candidates, the one declared first wins
//!
//! The baseline is always a candidate, so resolution always succeeds.

use crate::caps::CapabilitySet;
use crate::registry::{Variant, VariantRegistry};

/// Best variant of `registry` for a processor with `detected`.
///
/// # Example
/// ```
/// use multiver_dispatch::{resolve, CapabilitySet, VariantRegistry};
///
/// fn slow() -> &'static str { "baseline" }
/// fn fast() -> &'static str { "sse2" }
///
/// let registry = unsafe {
///     VariantRegistry::<fn() -> &'static str>::builder("demo")
///         .baseline(slow)
///         .variant("sse2", CapabilitySet::X86_SSE2, fast)
/// }
/// .build()
/// .unwrap();
///
/// assert_eq!(resolve(&registry, CapabilitySet::empty()).name(), "baseline");
/// assert_eq!(resolve(&registry, CapabilitySet::X86_SSE2).name(), "sse2");
/// ```
pub fn resolve<F: Copy>(registry: &VariantRegistry<F>, detected: CapabilitySet) -> &Variant<F> {
    let index = select_index(registry.variants(), detected).unwrap_or(registry.baseline_index());
    &registry.variants()[index]
}

/// Index of the best supported variant in `variants`, or `None` if no
/// variant is supported (only possible for a list without a baseline).
pub fn select_index<F: Copy>(variants: &[Variant<F>], detected: CapabilitySet) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (index, variant) in variants.iter().enumerate() {
        if !variant.is_supported_by(detected) {
            continue;
        }
        let specificity = variant.required().specificity();
        match best {
            Some((_, best_specificity)) if best_specificity >= specificity => {}
            _ => best = Some((index, specificity)),
        }
    }
    best.map(|(index, _)| index)
}

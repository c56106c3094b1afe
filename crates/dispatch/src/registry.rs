//! Variant Registry
//!
//! Each logical operation owns one [`VariantRegistry`]: an ordered list of
//! [`Variant`]s, each a function pointer tagged with the capabilities it
//! needs. Registries are built through [`RegistryBuilder`], which enforces:
//!
//! - exactly one variant with the empty (baseline) requirement
//! - no two variants with the same requirement
//! - every requirement is consistent under the implication table
//!
//! After [`build`](RegistryBuilder::build) succeeds the registry is never
//! mutated.

use std::fmt;

use crate::caps::CapabilitySet;
use crate::error::RegistrationError;
use crate::profile::Profile;

/// One compiled implementation of an operation.
///
/// `F` is a function-pointer type. The pointer is only safe to call when the
/// running processor has every extension in [`required`](Self::required),
/// which is why it is not handed out directly.
#[derive(Clone, Copy)]
pub struct Variant<F> {
    name: &'static str,
    required: CapabilitySet,
    func: F,
}

impl<F: Copy> Variant<F> {
    /// Diagnostic name, e.g. `"avx2"`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Extensions this variant was compiled for.
    pub fn required(&self) -> CapabilitySet {
        self.required
    }

    pub fn is_baseline(&self) -> bool {
        self.required.is_empty()
    }

    /// `true` if a processor with `caps` can run this variant.
    pub fn is_supported_by(&self, caps: CapabilitySet) -> bool {
        self.required.is_subset_of(caps)
    }

    /// The function pointer, if the process-wide detected set covers the
    /// requirement.
    pub fn func_if_supported(&self) -> Option<F> {
        self.is_supported_by(crate::probe::detected())
            .then_some(self.func)
    }

    /// The function pointer, without checking the requirement.
    ///
    /// # Safety
    /// The caller must ensure the processor the pointer is called on has
    /// every extension in [`required`](Self::required).
    pub unsafe fn func_unchecked(&self) -> F {
        self.func
    }

    pub(crate) fn func(&self) -> F {
        self.func
    }
}

impl<F> fmt::Debug for Variant<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("name", &self.name)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// Ordered, validated set of variants for one operation.
pub struct VariantRegistry<F> {
    operation: &'static str,
    variants: Vec<Variant<F>>,
    baseline: usize,
}

impl<F: Copy> VariantRegistry<F> {
    /// Start registering variants for `operation`.
    pub fn builder(operation: &'static str) -> RegistryBuilder<F> {
        RegistryBuilder {
            operation,
            variants: Vec::new(),
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Variants in declaration order.
    pub fn variants(&self) -> &[Variant<F>] {
        &self.variants
    }

    /// The variant with the empty requirement.
    pub fn baseline(&self) -> &Variant<F> {
        &self.variants[self.baseline]
    }

    pub(crate) fn baseline_index(&self) -> usize {
        self.baseline
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Always `false` for a built registry; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl<F> fmt::Debug for VariantRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantRegistry")
            .field("operation", &self.operation)
            .field("variants", &self.variants)
            .finish()
    }
}

/// Collects variants and validates them in [`build`](Self::build).
pub struct RegistryBuilder<F> {
    operation: &'static str,
    variants: Vec<Variant<F>>,
}

impl<F: Copy> RegistryBuilder<F> {
    /// Register the capability-independent implementation.
    pub fn baseline(mut self, func: F) -> Self {
        self.variants.push(Variant {
            name: Profile::BASELINE.name,
            required: CapabilitySet::BASELINE,
            func,
        });
        self
    }

    /// Register an implementation that needs `required`.
    ///
    /// # Safety
    /// `func` may only execute instructions from the extensions in
    /// `required` (and the baseline). The resolver will hand it out to any
    /// processor whose detected set covers `required`.
    pub unsafe fn variant(mut self, name: &'static str, required: CapabilitySet, func: F) -> Self {
        self.variants.push(Variant {
            name,
            required,
            func,
        });
        self
    }

    /// Register an implementation compiled under `profile`.
    ///
    /// # Safety
    /// `func` must have been compiled with at most `profile.target_features`
    /// enabled.
    pub unsafe fn profile(self, profile: &Profile, func: F) -> Self {
        // SAFETY: forwarded to the caller.
        unsafe { self.variant(profile.name, profile.caps, func) }
    }

    /// Validate and freeze the registry.
    pub fn build(self) -> Result<VariantRegistry<F>, RegistrationError> {
        let operation = self.operation;
        if self.variants.is_empty() {
            return Err(RegistrationError::Empty { operation });
        }

        for (i, variant) in self.variants.iter().enumerate() {
            let closure = variant.required.with_implied();
            if closure != variant.required {
                return Err(RegistrationError::InconsistentRequirement {
                    operation,
                    variant: variant.name,
                    required: variant.required,
                    missing: closure.difference(variant.required),
                });
            }
            if let Some(earlier) = self.variants[..i]
                .iter()
                .find(|v| v.required == variant.required)
            {
                return Err(RegistrationError::DuplicateRequirement {
                    operation,
                    first: earlier.name,
                    second: variant.name,
                    required: variant.required,
                });
            }
        }

        let baseline = self
            .variants
            .iter()
            .position(|v| v.required.is_empty())
            .ok_or(RegistrationError::MissingBaseline { operation })?;

        Ok(VariantRegistry {
            operation,
            variants: self.variants,
            baseline,
        })
    }
}

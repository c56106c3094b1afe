//! Runtime Dispatcher
//!
//! A [`Dispatcher`] is the once-resolved cache behind a dispatch stub. It is
//! meant to live in a `static`:
//!
//! ```
//! use multiver_dispatch::{Dispatcher, RegistrationError, VariantRegistry};
//!
//! type SumFn = fn(&[f32]) -> f32;
//!
//! fn sum_scalar(xs: &[f32]) -> f32 {
//!     xs.iter().sum()
//! }
//!
//! fn sum_registry() -> Result<VariantRegistry<SumFn>, RegistrationError> {
//!     VariantRegistry::builder("sum").baseline(sum_scalar as SumFn).build()
//! }
//!
//! static SUM: Dispatcher<SumFn> = Dispatcher::new("sum", sum_registry);
//!
//! pub fn sum(xs: &[f32]) -> f32 {
//!     (SUM.get())(xs)
//! }
//!
//! assert_eq!(sum(&[1.0, 2.0, 3.0]), 6.0);
//! ```
//!
//! # Performance
//! The first call builds the registry, reads the detected capability set and
//! runs the resolver. Every later call is one acquire load of the
//! `OnceLock` plus the indirect call. Concurrent first calls block on the
//! same initializer; resolution runs exactly once.

use std::fmt;
use std::sync::OnceLock;

use crate::caps::CapabilitySet;
use crate::error::RegistrationError;
use crate::registry::{Variant, VariantRegistry};
use crate::resolver;

type BuildFn<F> = fn() -> Result<VariantRegistry<F>, RegistrationError>;

/// Cached outcome of resolving one operation.
pub struct Resolution<F> {
    registry: VariantRegistry<F>,
    selected: usize,
    detected: CapabilitySet,
    func: F,
}

impl<F: Copy> Resolution<F> {
    /// The chosen variant.
    pub fn variant(&self) -> &Variant<F> {
        &self.registry.variants()[self.selected]
    }

    pub fn registry(&self) -> &VariantRegistry<F> {
        &self.registry
    }

    /// The capability set resolution was performed against.
    pub fn detected(&self) -> CapabilitySet {
        self.detected
    }
}

/// Once-resolved function pointer for one logical operation.
pub struct Dispatcher<F: Copy + 'static> {
    operation: &'static str,
    build: BuildFn<F>,
    arch_info: fn() -> CapabilitySet,
    state: OnceLock<Resolution<F>>,
}

impl<F: Copy + 'static> Dispatcher<F> {
    /// A dispatcher resolving against the process-wide
    /// [`detected`](crate::detected) set.
    pub const fn new(operation: &'static str, build: BuildFn<F>) -> Self {
        Self::with_arch_info(operation, build, crate::probe::detected)
    }

    /// A dispatcher resolving against whatever `arch_info` returns.
    ///
    /// `arch_info` is called once, on first resolution. Tests use this to
    /// simulate processors.
    pub const fn with_arch_info(
        operation: &'static str,
        build: BuildFn<F>,
        arch_info: fn() -> CapabilitySet,
    ) -> Self {
        Self {
            operation,
            build,
            arch_info,
            state: OnceLock::new(),
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// The resolved function pointer.
    ///
    /// # Panics
    /// On first use, if the registry fails validation.
    #[inline]
    pub fn get(&self) -> F {
        self.resolution().func
    }

    /// Resolve now rather than on first call.
    pub fn warm(&self) {
        self.resolution();
    }

    pub fn is_resolved(&self) -> bool {
        self.state.get().is_some()
    }

    /// The chosen variant.
    pub fn resolved(&self) -> &Variant<F> {
        self.resolution().variant()
    }

    /// Every registered variant in declaration order.
    pub fn variants(&self) -> &[Variant<F>] {
        self.resolution().registry().variants()
    }

    /// The full cached resolution, resolving first if needed.
    #[inline]
    pub fn resolution(&self) -> &Resolution<F> {
        self.state.get_or_init(|| self.resolve_now())
    }

    #[cold]
    fn resolve_now(&self) -> Resolution<F> {
        let registry = match (self.build)() {
            Ok(registry) => registry,
            Err(err) => {
                tracing::error!(operation = self.operation, error = %err, "invalid variant registry");
                panic!("multiver: {err}");
            }
        };

        let detected = (self.arch_info)();
        let selected = resolver::select_index(registry.variants(), detected)
            .unwrap_or(registry.baseline_index());
        let variant = &registry.variants()[selected];

        tracing::info!(
            operation = self.operation,
            variant = variant.name(),
            required = %variant.required(),
            "operation resolved"
        );

        Resolution {
            func: variant.func(),
            registry,
            selected,
            detected,
        }
    }
}

impl<F: Copy + 'static> fmt::Debug for Dispatcher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Dispatcher");
        s.field("operation", &self.operation);
        match self.state.get() {
            Some(resolution) => s.field("resolved", &resolution.variant().name()),
            None => s.field("resolved", &Option::<&str>::None),
        };
        s.finish()
    }
}

// ============================================================================
// Type-erased view for diagnostics
// ============================================================================

/// Name and requirement of one variant, independent of its signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSummary {
    pub name: &'static str,
    pub required: CapabilitySet,
}

impl<F: Copy> From<&Variant<F>> for VariantSummary {
    fn from(variant: &Variant<F>) -> Self {
        Self {
            name: variant.name(),
            required: variant.required(),
        }
    }
}

/// Object-safe view of a [`Dispatcher`], so dispatchers with different
/// signatures can be listed together.
pub trait OperationInfo: Sync {
    fn operation(&self) -> &'static str;

    /// Registered variants in declaration order.
    fn variant_summaries(&self) -> Vec<VariantSummary>;

    /// The variant calls are routed to. Resolves if needed.
    fn resolved_summary(&self) -> VariantSummary;
}

impl<F: Copy + Send + Sync + 'static> OperationInfo for Dispatcher<F> {
    fn operation(&self) -> &'static str {
        self.operation
    }

    fn variant_summaries(&self) -> Vec<VariantSummary> {
        self.variants().iter().map(VariantSummary::from).collect()
    }

    fn resolved_summary(&self) -> VariantSummary {
        self.resolved().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Op = fn() -> u32;

    fn zero() -> u32 {
        0
    }

    fn three() -> u32 {
        3
    }

    fn sse3_machine() -> CapabilitySet {
        CapabilitySet::X86_SSE2 | CapabilitySet::X86_SSE3
    }

    fn build() -> Result<VariantRegistry<Op>, RegistrationError> {
        unsafe {
            VariantRegistry::<Op>::builder("three")
                .baseline(zero)
                .variant("sse3", sse3_machine(), three)
        }
        .build()
    }

    fn broken() -> Result<VariantRegistry<Op>, RegistrationError> {
        VariantRegistry::<Op>::builder("broken").build()
    }

    #[test]
    fn test_lazy_resolution() {
        let dispatcher = Dispatcher::with_arch_info("three", build, sse3_machine);
        assert!(!dispatcher.is_resolved());
        assert_eq!((dispatcher.get())(), 3);
        assert!(dispatcher.is_resolved());
        assert_eq!(dispatcher.resolved().name(), "sse3");
        assert_eq!(dispatcher.resolution().detected(), sse3_machine());
    }

    #[test]
    fn test_warm_resolves_eagerly() {
        let dispatcher = Dispatcher::with_arch_info("three", build, CapabilitySet::empty);
        dispatcher.warm();
        assert!(dispatcher.is_resolved());
        assert_eq!(dispatcher.resolved().name(), "baseline");
    }

    #[test]
    fn test_operation_info_view() {
        let dispatcher = Dispatcher::with_arch_info("three", build, sse3_machine);
        let info: &dyn OperationInfo = &dispatcher;
        assert_eq!(info.operation(), "three");
        assert_eq!(info.variant_summaries().len(), 2);
        assert_eq!(info.resolved_summary().name, "sse3");
    }

    #[test]
    #[should_panic(expected = "has no variants")]
    fn test_invalid_registry_panics_on_first_use() {
        let dispatcher = Dispatcher::with_arch_info("broken", broken, CapabilitySet::empty);
        dispatcher.get();
    }
}

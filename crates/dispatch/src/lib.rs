//! # multiver-dispatch
//!
//! Function multiversioning for SIMD code: compile one logical operation
//! several times, once per instruction-set profile, and pick the best copy
//! the running processor supports the first time it is called.
//!
//! ## Components
//!
//! - [`CapabilitySet`]: bit-vector algebra over ISA extensions
//! - [`probe`]: detects the running processor's extensions (CPUID, runtime
//!   feature detection, `/proc/cpuinfo`)
//! - [`VariantRegistry`]: per operation, the capability-tagged variants
//! - [`resolve`]: picks the most specific supported variant
//! - [`Dispatcher`]: caches the choice in a `OnceLock`; one indirect call
//!   per invocation after warm-up
//! - [`multiversion!`]: generates all of the above from one function body
//!
//! ## Example
//!
//! ```
//! multiver_dispatch::multiversion! {
//!     pub fn scale(input: &[f32], factor: f32, output: &mut [f32]) {
//!         for (o, x) in output.iter_mut().zip(input) {
//!             *o = x * factor;
//!         }
//!     }
//! }
//!
//! let mut out = [0.0; 4];
//! scale(&[1.0, 2.0, 3.0, 4.0], 2.0, &mut out);
//! assert_eq!(out, [2.0, 4.0, 6.0, 8.0]);
//! ```
//!
//! ## Cargo features
//!
//! - `runtime-dispatch` (default): probe the running processor. Without it
//!   the detected set is the compile-time target-feature set.
//! - `force-baseline`: the detected set is always empty, so every operation
//!   runs its baseline variant.
//!
//! `tests/cargo_features.rs` covers both; run it with `--features
//! force-baseline` and with `--no-default-features`.
//!
//! ## Environment
//!
//! `MULTIVER_FORCE_SUPPORTED` and `MULTIVER_FORCE_UNSUPPORTED` take comma
//! separated extension names (`sse4.1`, `avx2`, `neon`, ...) and adjust the
//! detected set before it is fixed. See [`CapabilityOverride`].

pub mod caps;
pub mod config;
pub mod dispatcher;
pub mod error;
mod macros;
pub mod probe;
pub mod profile;
pub mod registry;
pub mod resolver;

pub use caps::CapabilitySet;
pub use config::{CapabilityOverride, FORCE_SUPPORTED_ENV, FORCE_UNSUPPORTED_ENV};
pub use dispatcher::{Dispatcher, OperationInfo, Resolution, VariantSummary};
pub use error::{AlreadyInitialized, ParseCapabilityError, RegistrationError};
pub use probe::{
    detect, detected, detection_report, init_with_override, init_with_probe, DetectionReport,
    Probe, ProbeTechnique,
};
pub use profile::{compiled_profiles, Profile};
pub use registry::{RegistryBuilder, Variant, VariantRegistry};
pub use resolver::{resolve, select_index};

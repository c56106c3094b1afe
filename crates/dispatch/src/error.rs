//! Error types for registry construction and capability parsing.

use thiserror::Error;

use crate::caps::CapabilitySet;

/// A variant registry that breaks one of its construction rules.
///
/// These are programming errors in the registering code. A
/// [`Dispatcher`](crate::Dispatcher) that hits one logs it and panics on
/// first use.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// No variants were registered at all.
    #[error("operation `{operation}` has no variants")]
    Empty { operation: &'static str },

    /// No variant with the empty requirement.
    #[error("operation `{operation}` has no baseline variant")]
    MissingBaseline { operation: &'static str },

    /// Two variants share the same requirement; the resolver could not
    /// choose between them on their own merits.
    #[error("operation `{operation}`: variants `{first}` and `{second}` both require {required}")]
    DuplicateRequirement {
        operation: &'static str,
        first: &'static str,
        second: &'static str,
        required: CapabilitySet,
    },

    /// A requirement hardware can never report, such as AVX2 without AVX.
    #[error(
        "operation `{operation}`: variant `{variant}` requires {required}, \
         which is missing implied extensions {missing}"
    )]
    InconsistentRequirement {
        operation: &'static str,
        variant: &'static str,
        required: CapabilitySet,
        missing: CapabilitySet,
    },
}

/// Text that does not name a known instruction-set extension.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCapabilityError {
    #[error("unknown instruction-set extension `{name}`")]
    UnknownIsa { name: String },
}

/// Returned by the `init_*` functions once the process-wide capability set
/// has been fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("capability detection already ran; the override must be installed before first use")]
pub struct AlreadyInitialized;

//! Capability overrides.
//!
//! Overrides let tests and users pretend extensions are present or absent.
//! They are applied on top of whatever the probe reports, before the
//! process-wide set is fixed.

use crate::caps::CapabilitySet;
use crate::error::ParseCapabilityError;

/// Environment variable naming extensions to treat as present.
/// Names expand through the implication table.
pub const FORCE_SUPPORTED_ENV: &str = "MULTIVER_FORCE_SUPPORTED";

/// Environment variable naming extensions to treat as absent (exact bits).
pub const FORCE_UNSUPPORTED_ENV: &str = "MULTIVER_FORCE_UNSUPPORTED";

/// Bits forced on or off on top of the probed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilityOverride {
    pub forced_supported: CapabilitySet,
    pub forced_unsupported: CapabilitySet,
}

impl CapabilityOverride {
    /// No bits forced either way.
    pub const NONE: Self = Self {
        forced_supported: CapabilitySet::empty(),
        forced_unsupported: CapabilitySet::empty(),
    };

    pub fn new(forced_supported: CapabilitySet, forced_unsupported: CapabilitySet) -> Self {
        Self {
            forced_supported,
            forced_unsupported,
        }
    }

    /// Build an override from textual lists as accepted on the command line.
    ///
    /// `supported` is closed under the implication table, `unsupported` is
    /// taken literally.
    pub fn parse(
        supported: Option<&str>,
        unsupported: Option<&str>,
    ) -> Result<Self, ParseCapabilityError> {
        let forced_supported = supported
            .map(CapabilitySet::parse_implied)
            .transpose()?
            .unwrap_or_default();
        let forced_unsupported = unsupported
            .map(CapabilitySet::parse_list)
            .transpose()?
            .unwrap_or_default();
        Ok(Self::new(forced_supported, forced_unsupported))
    }

    /// Read [`FORCE_SUPPORTED_ENV`] and [`FORCE_UNSUPPORTED_ENV`].
    ///
    /// A variable that does not parse is ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str, parse: fn(&str) -> Result<CapabilitySet, ParseCapabilityError>| {
            let text = lookup(key)?;
            match parse(&text) {
                Ok(caps) => Some(caps),
                Err(err) => {
                    tracing::warn!(variable = key, value = %text, error = %err, "ignoring capability override");
                    None
                }
            }
        };

        Self {
            forced_supported: read(FORCE_SUPPORTED_ENV, CapabilitySet::parse_implied)
                .unwrap_or_default(),
            forced_unsupported: read(FORCE_UNSUPPORTED_ENV, CapabilitySet::parse_list)
                .unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.forced_supported.is_empty() && self.forced_unsupported.is_empty()
    }

    /// Bits named both ways. Forced-unsupported wins for these.
    pub fn conflicts(&self) -> CapabilitySet {
        self.forced_supported & self.forced_unsupported
    }

    /// `(probed ∪ forced_supported) \ forced_unsupported`.
    pub fn apply(&self, probed: CapabilitySet) -> CapabilitySet {
        let conflicts = self.conflicts();
        if !conflicts.is_empty() {
            tracing::warn!(
                bits = %conflicts,
                "extensions forced both supported and unsupported; treating them as unsupported"
            );
        }
        probed
            .union(self.forced_supported)
            .difference(self.forced_unsupported)
    }
}

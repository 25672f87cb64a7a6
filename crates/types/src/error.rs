//! Error kinds shared across the workspace.

use thiserror::Error;

/// A scenario document failed validation.
///
/// Raised at scenario load, before any replica starts. This is the only error
/// that prevents an experiment from starting at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A field violated its range or relational invariant.
    #[error("invalid scenario field `{field}`: {reason}")]
    InvalidField {
        /// The offending field name.
        field: &'static str,
        /// Human-readable description of the violation.
        reason: String,
    },
}

impl ConfigurationError {
    /// Shorthand used by the scenario validator.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// A state invariant was observed broken while a replica was running.
///
/// Fatal to the replica only: the executor records the failure and keeps
/// running the remaining replicas.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A runtime invariant (inventory bounds, mass balance, order cap) broke.
    #[error("invariant violated on day {day}: {detail}")]
    InvariantViolation {
        /// Simulation day on which the violation was detected (0 = end of run).
        day: u32,
        /// Which invariant broke, with the observed values.
        detail: String,
    },
}

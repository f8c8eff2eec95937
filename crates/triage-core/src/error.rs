//! Triage core error types.
//!
//! Classification and lifecycle advancement never fail for expected input:
//! empty text falls back to defaults and advancing a closed request is a
//! no-op.  The variants below cover the remaining cases, where a caller
//! handed the core a value it could not have produced itself.

/// Unified error type for the triage core.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    // -- Lifecycle errors ---------------------------------------------------
    /// A status string does not name one of the six lifecycle states.
    #[error("invalid lifecycle state: {value:?}")]
    InvalidState { value: String },

    // -- Field errors -------------------------------------------------------
    /// An enumerated request field (channel, priority, ...) has an unknown
    /// value.
    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    /// A stored request violates a record invariant.
    #[error("invalid request #{id}: {reason}")]
    InvalidRecord { id: u64, reason: String },

    // -- Rule table errors --------------------------------------------------
    /// A classification rule is malformed.
    #[error("invalid rule #{index}: {reason}")]
    InvalidRule { index: usize, reason: String },

    /// Building the keyword automaton failed.
    #[error("rule table build error: {reason}")]
    RuleTableBuild { reason: String },
}

/// Convenience alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, TriageError>;

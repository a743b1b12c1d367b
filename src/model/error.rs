//! Construction-time errors.

use thiserror::Error;

use super::types::Owner;

/// A problem that makes the input unusable for search.
///
/// Raised only by [`Problem::new`](super::Problem::new). Infeasibility and
/// budget exhaustion are search outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The candidate's required count is negative or cannot fit the owner's cells.
    #[error("invalid candidate {label:?} for {owner}: {reason}")]
    InvalidCandidate {
        owner: Owner,
        label: String,
        reason: String,
    },

    /// Two candidates share the same owner and label.
    #[error("duplicate candidate {label:?} for {owner}")]
    DuplicateCandidate { owner: Owner, label: String },

    /// A forced rule names a sentinel that is not a candidate of the owner.
    #[error("forced rule for {owner} names {label:?}, which is not one of its candidates")]
    NoForcedCandidate { owner: Owner, label: String },

    /// Rules, forced slots and limits cannot hold together.
    #[error("configuration contradiction: {0}")]
    ConfigurationContradiction(String),
}

impl ModelError {
    pub(crate) fn contradiction(message: impl Into<String>) -> Self {
        ModelError::ConfigurationContradiction(message.into())
    }
}

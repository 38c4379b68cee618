//! Error taxonomy for the planner.
//!
//! Nothing here is fatal to the process: every variant maps to a
//! recoverable state (an empty plan, a failed image slot, an unsaved edit).

use thiserror::Error;
use wayfarer_store::StoreError;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// The generation output did not match the expected plan shape.
    #[error("malformed plan payload: {0}")]
    MalformedPayload(String),

    /// A collaborator call (plan or image generation) failed outright.
    #[error("{collaborator} call failed: {message}")]
    TransportFailure {
        collaborator: &'static str,
        message: String,
    },

    /// A write to the local store failed. In-memory state is unchanged.
    #[error("could not persist {key:?}: {source}")]
    StorageFailure {
        key: &'static str,
        #[source]
        source: StorageCause,
    },

    /// A stored blob could not be decoded. Callers purge it and carry on.
    #[error("persisted state under {key:?} is corrupt: {reason}")]
    CorruptPersistedState { key: &'static str, reason: String },

    #[error("invalid trip parameters: {0}")]
    InvalidParameters(String),

    #[error("no such {0}")]
    NoSuchItem(String),

    #[error("no plan is loaded")]
    NoPlan,
}

/// Underlying reason for a [`PlannerError::StorageFailure`].
#[derive(Debug, Error)]
pub enum StorageCause {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PlannerError {
    /// Whether the user can simply try the same action again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::MalformedPayload(_) | Self::TransportFailure { .. } | Self::StorageFailure { .. }
        )
    }

    /// Whether the failure is a storage quota rejection.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(
            self,
            Self::StorageFailure {
                source: StorageCause::Store(StoreError::QuotaExceeded { .. }),
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(PlannerError::MalformedPayload("x".into()).is_retryable());
        assert!(
            PlannerError::TransportFailure {
                collaborator: "plan generator",
                message: "503".into()
            }
            .is_retryable()
        );
        assert!(!PlannerError::NoPlan.is_retryable());
        assert!(!PlannerError::InvalidParameters("x".into()).is_retryable());
    }

    #[test]
    fn quota_detection() {
        let err = PlannerError::StorageFailure {
            key: "k",
            source: StorageCause::Store(StoreError::QuotaExceeded {
                key: "k".into(),
                needed: 10,
                available: 1,
            }),
        };
        assert!(err.is_quota_exceeded());
        assert!(err.to_string().contains("quota"));
    }
}

//! Failure values surfaced by optimistic mutations.
//!
//! # Invariants
//! - When a caller observes any of these errors, the store has already been
//!   reverted to (or was never moved from) its pre-mutation state.

use crate::model::entity::EntityId;
use crate::remote::RemoteError;
use crate::validation::ValidationErrors;

pub type MutationResult<T> = Result<T, MutationError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    /// Validation rejected the input before the store was touched.
    #[error("invalid input: {0}")]
    InvalidInput(ValidationErrors),
    /// The target id is not present locally; no remote call was made.
    #[error("entity not found: {0}")]
    NotFound(EntityId),
    #[error("create failed: {0}")]
    CreateFailed(#[source] RemoteError),
    #[error("update of {id} failed: {source}")]
    UpdateFailed {
        id: EntityId,
        #[source]
        source: RemoteError,
    },
    #[error("delete of {id} failed: {source}")]
    DeleteFailed {
        id: EntityId,
        #[source]
        source: RemoteError,
    },
    #[error("refresh failed: {0}")]
    RefreshFailed(#[source] RemoteError),
}

impl MutationError {
    /// The remote failure behind this error, if the remote call ran.
    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            Self::CreateFailed(source) | Self::RefreshFailed(source) => Some(source),
            Self::UpdateFailed { source, .. } | Self::DeleteFailed { source, .. } => Some(source),
            Self::InvalidInput(_) | Self::NotFound(_) => None,
        }
    }

    /// Stable short label for diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::CreateFailed(_) => "create_failed",
            Self::UpdateFailed { .. } => "update_failed",
            Self::DeleteFailed { .. } => "delete_failed",
            Self::RefreshFailed(_) => "refresh_failed",
        }
    }
}

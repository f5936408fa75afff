//! Errors shared by the group, membership, and directory ports.

use crate::group::domain::{GroupId, UserId};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for store operations.
pub type GroupStoreResult<T> = Result<T, GroupStoreError>;

/// Step of the atomic group creation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationStep {
    /// Inserting the group row.
    InsertGroup,
    /// Inserting the creator's administrator membership.
    InsertAdminMembership,
    /// Beginning or committing the transaction.
    Transaction,
}

impl fmt::Display for CreationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InsertGroup => "insert group",
            Self::InsertAdminMembership => "insert admin membership",
            Self::Transaction => "transaction",
        })
    }
}

/// Errors returned by group store implementations.
#[derive(Debug, Clone, Error)]
pub enum GroupStoreError {
    /// No group has the given identifier.
    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    /// The user is not a member of the group.
    #[error("user {user_id} is not a member of group {group_id}")]
    MembershipNotFound {
        /// Group side of the missing membership.
        group_id: GroupId,
        /// User side of the missing membership.
        user_id: UserId,
    },

    /// The user directory has no user with the given external identifier.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// The user is already a member of the group.
    #[error("user {user_id} is already a member of group {group_id}")]
    DuplicateMembership {
        /// Group side of the existing membership.
        group_id: GroupId,
        /// User side of the existing membership.
        user_id: UserId,
    },

    /// Atomic group creation failed and was rolled back.
    #[error("group creation failed at {step}: {source}")]
    CreationFailed {
        /// The step that failed.
        step: CreationStep,
        /// Underlying cause.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// A write did not finish within its deadline and was rolled back.
    #[error("write deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl GroupStoreError {
    /// Wraps a failure of one step of atomic group creation.
    pub fn creation_failed(
        step: CreationStep,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::CreationFailed {
            step,
            source: Arc::new(err),
        }
    }

    /// Wraps a data-quality error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` when the error reports an absent target row.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::GroupNotFound(_) | Self::MembershipNotFound { .. } | Self::UserNotFound(_)
        )
    }
}

/// Translates a keyed update or delete that touched no rows into an error.
///
/// Every adapter routes its targeted mutations through this check so that a
/// no-op is never reported as success.
///
/// # Errors
///
/// Returns the error built by `missing` when `affected` is zero.
pub fn ensure_rows_affected<F>(affected: usize, missing: F) -> GroupStoreResult<()>
where
    F: FnOnce() -> GroupStoreError,
{
    if affected == 0 {
        return Err(missing());
    }
    Ok(())
}

//! Lookup port onto the external user directory.

use super::GroupStoreResult;
use crate::group::domain::UserId;
use async_trait::async_trait;

/// Resolves identity-provider identifiers to internal user keys.
///
/// Membership insertion never consults the directory; user existence on
/// insert is enforced by the store's foreign keys.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds the internal key of the user with the given external id.
    ///
    /// Returns `None` when no such user exists.
    async fn find_user_id(&self, external_id: &str) -> GroupStoreResult<Option<UserId>>;
}

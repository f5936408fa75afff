//! Port contracts for group and membership persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by the group
//! membership service. Adapters in [`crate::group::adapters`] implement them.

pub mod deadline;
pub mod directory;
pub mod error;
pub mod membership;
pub mod repository;

pub use deadline::WriteDeadline;
pub use directory::UserDirectory;
pub use error::{CreationStep, GroupStoreError, GroupStoreResult, ensure_rows_affected};
pub use membership::MembershipRepository;
pub use repository::GroupRepository;

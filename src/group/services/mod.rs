//! Application services for group and membership management.

mod membership;

pub use membership::{
    CreateGroupRequest, GroupMembershipService, GroupServiceError, GroupServiceResult,
};

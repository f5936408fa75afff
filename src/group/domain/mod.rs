//! Domain model for groups, memberships, and membership roles.
//!
//! Groups are named collections of users; memberships bind one user to one
//! group with a [`MembershipRole`] and a join timestamp. The domain has no
//! infrastructure dependencies: persistence lives behind the ports.

mod error;
mod group;
mod ids;
mod member;
mod membership;
mod name;
mod role;

pub use error::{GroupDomainError, ParseRoleError};
pub use group::{Group, NewGroup, PersistedGroupData};
pub use ids::{GroupId, UserId};
pub use member::{GroupMember, MemberProfile};
pub use membership::Membership;
pub use name::GroupName;
pub use role::{MembershipRole, is_valid_role};

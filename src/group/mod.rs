//! Group membership and role consistency engine.
//!
//! Creates groups together with their founding administrator, manages
//! memberships and roles, and keeps the `group` and `group_membership` tables
//! mutually consistent. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

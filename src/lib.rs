//! Roster: group membership and role management over a relational store.
//!
//! This crate creates organizational groups together with their founding
//! administrator, manages which users belong to which groups, and validates
//! the role each member holds, keeping group and membership rows consistent.
//!
//! # Architecture
//!
//! Roster follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (`PostgreSQL`, in-memory)
//!
//! # Modules
//!
//! - [`group`]: Groups, memberships, roles, and their orchestration service
//! - [`config`]: Environment-driven store and deadline configuration

pub mod config;
pub mod group;

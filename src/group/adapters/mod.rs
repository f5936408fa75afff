//! Adapter implementations for group and membership ports.

pub mod memory;
pub mod postgres;

//! In-memory adapters for group and membership persistence.

mod store;

pub use store::{ConstraintViolation, InMemoryGroupStore};

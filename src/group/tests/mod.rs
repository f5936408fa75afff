//! Unit tests for the group membership module.

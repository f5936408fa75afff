//! Time budget handed to store writes.

use std::time::{Duration, Instant};

/// Budget within which a store write must either finish or fail with no
/// committed effect.
///
/// The budget starts when the deadline is created. Implementations that
/// cannot finish in time return
/// [`super::GroupStoreError::DeadlineExceeded`] only after any partial work
/// has been rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteDeadline {
    started: Instant,
    limit: Duration,
}

impl WriteDeadline {
    /// Starts a budget of `limit` from now.
    #[must_use]
    pub fn starting_now(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    /// Returns the full budget.
    #[must_use]
    pub const fn limit(&self) -> Duration {
        self.limit
    }

    /// Returns the part of the budget not yet used.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.started.elapsed())
    }

    /// Returns `true` once the budget is used up.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }
}

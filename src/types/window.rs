//! Iteration window: one time-bounded governance cycle on the calendar

use serde::{Deserialize, Serialize};

/// A single entry in the iteration calendar.
///
/// Windows never overlap; both boundaries are inclusive, so a timestamp equal
/// to `start` or `end` belongs to the window. Iteration numbers are 1-based -
/// 0 is reserved for "no active iteration".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationWindow {
    /// Iteration number this window maps to (>= 1)
    pub iteration_number: u32,
    /// Window start (Unix seconds, inclusive)
    pub start: i64,
    /// Window end (Unix seconds, inclusive)
    pub end: i64,
    /// Claim amount configured for this iteration
    pub claim_amount: u16,
    /// Tokens required to participate in this iteration
    pub tokens_required: u16,
}

impl IterationWindow {
    /// Create a window with default claim parameters
    pub fn new(iteration_number: u32, start: i64, end: i64) -> Self {
        Self {
            iteration_number,
            start,
            end,
            claim_amount: 0,
            tokens_required: 0,
        }
    }

    /// Is `now` inside this window (inclusive on both ends)?
    pub fn contains(&self, now: i64) -> bool {
        now >= self.start && now <= self.end
    }
}

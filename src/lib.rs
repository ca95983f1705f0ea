//! govcycle: iteration-based governance lifecycle engine
//!
//! Pipeline: calendar resolve → tick → submission → tally → transition.
//! Every mutating entry point ticks first, so iteration transitions fire
//! lazily on the first touch after a calendar boundary, never from a timer.

pub mod core;
pub mod types;

// =============================================================================
// PROTOCOL CONSTANTS
// =============================================================================

/// Rotating participation slots per activity.
/// The slot for iteration i is `i % SLOT_COUNT`; records older than SLOT_COUNT
/// iterations are overwritten, so storage stays bounded per participant.
pub const SLOT_COUNT: usize = 5;

/// Hard floor for the exchange rate used in locking-threshold bounds.
/// The q3 upper bound is `lockfactor * max(current_price, HARD_PRICE_FLOOR)`.
pub const HARD_PRICE_FLOOR: f64 = 0.0167;

/// Maximum partner picks per vote (question 6)
pub const MAX_PARTNER_PICKS: usize = 3;

/// Number of partner options on the ballot (question 6)
pub const PARTNER_OPTION_COUNT: usize = 6;

// =============================================================================
// PARAMETER KEYS
// =============================================================================

/// Minimum participants for the locking threshold result to be published
pub const PARAM_LOCK_QUORUM: &str = "lockquorum";

/// Multiplier applied to the current price for the q3 upper bound
pub const PARAM_LOCK_FACTOR: &str = "lockfactor";

/// Slider ranges for q1/q2/q5, e.g. "q1:0-100,q2:6-30,q5:0-50"
pub const PARAM_VOTE_RANGES: &str = "voteranges";

/// Default vote ranges used when the host has not configured any
pub const DEFAULT_VOTE_RANGES: &str = "q1:0-100,q2:6-30,q5:0-50";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "0.2.0";

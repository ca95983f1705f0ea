//! Error taxonomy for governance operations
//!
//! Two classes. Precondition failures describe a bad request and abort the
//! entry point before any aggregate mutation; the caller may resubmit a
//! corrected request. Fatal errors (`is_fatal`) mean a missing singleton or
//! broken storage - recovery needs an administrative action, not a retry.

use thiserror::Error;

use crate::types::activity::Activity;

/// Result type for governance operations
pub type GovResult<T> = Result<T, GovError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GovError {
    // =========================================================================
    // Precondition failures
    // =========================================================================
    /// Submitter is unknown to the eligibility oracle
    #[error("participant is not registered")]
    NotRegistered,

    /// Submitter has not staked the required tokens
    #[error("voting is not open to unstaked participants")]
    NotStaked,

    /// Submitter has not passed verification
    #[error("ratification is not open to unverified participants")]
    NotVerified,

    /// No calendar window covers the current time
    #[error("the system is not available at this time")]
    SystemInactive,

    /// The activity was already completed this iteration
    #[error("participant has already completed the {0} for this iteration")]
    AlreadyCompleted(Activity),

    /// A slider response fell outside its bounds
    #[error("{field} is out of range ({lower} - {upper})")]
    OutOfRange {
        field: &'static str,
        lower: f64,
        upper: f64,
    },

    /// Ratification requires a same-iteration vote
    #[error("participant must have voted in order to ratify")]
    VoteRequired,

    /// Partner picks must be distinct, 1..=6, at most three
    #[error("invalid partner selection: {0}")]
    InvalidPartnerChoice(String),

    /// A required configuration parameter is absent
    #[error("{0} is undefined")]
    MissingParameter(String),

    /// A configuration parameter could not be parsed
    #[error("invalid value for {key}: {value}")]
    InvalidParameter { key: String, value: String },

    /// The price oracle has no current price
    #[error("current price is undefined")]
    PriceUnavailable,

    /// Calendar configuration: window boundaries inverted
    #[error("iteration window {0} has end before start")]
    InvalidWindow(u32),

    /// Calendar configuration: window collides with an existing one
    #[error("iteration window {0} overlaps an existing window")]
    WindowOverlap(u32),

    // =========================================================================
    // Fatal errors (deployment / storage)
    // =========================================================================
    /// A required singleton record does not exist - init has not run
    #[error("{0} record is undefined")]
    MissingRecord(&'static str),

    /// Snapshot could not be serialized
    #[error("failed to serialize snapshot: {0}")]
    SnapshotSerialize(String),

    /// Snapshot could not be written or read
    #[error("failed to store snapshot: {0}")]
    SnapshotStorage(String),
}

impl GovError {
    /// Fatal errors need an administrative fix, not a corrected request
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GovError::MissingRecord(_)
                | GovError::SnapshotSerialize(_)
                | GovError::SnapshotStorage(_)
        )
    }
}

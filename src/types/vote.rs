//! Vote response: one participant's answers to the six ballot questions

use serde::{Deserialize, Serialize};

/// Question 4: where surplus goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SurplusAllocation {
    Pool,
    Burn,
}

impl std::fmt::Display for SurplusAllocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurplusAllocation::Pool => write!(f, "POOL"),
            SurplusAllocation::Burn => write!(f, "BURN"),
        }
    }
}

/// A complete vote submission.
///
/// q1/q2/q5 are sliders bounded by the `voteranges` parameter; q3 is bounded
/// by the price-derived locking threshold limit; q6 is up to three distinct
/// partner picks numbered 1 through 6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteResponse {
    /// q1: issuance rate (percent)
    pub issuance_rate: f64,
    /// q2: mint fee (percent)
    pub mint_fee_percent: f64,
    /// q3: locking threshold, expressed as an asset price
    pub locking_threshold: f64,
    /// q4: surplus allocation choice
    pub surplus_allocation: SurplusAllocation,
    /// q5: reserve pool release (percent)
    pub reserve_release_percent: f64,
    /// q6: partner picks, each 1..=6
    pub partners: Vec<u8>,
}

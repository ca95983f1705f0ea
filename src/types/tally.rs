//! Tally records: in-progress aggregates for the iteration being collected
//!
//! Both records are process-wide singletons with an explicit reset lifecycle:
//! they are zeroed in place at every iteration transition, never recreated.
//! Averages are incremental running means - no per-response history is kept.

use serde::{Deserialize, Serialize};

use crate::types::vote::{SurplusAllocation, VoteResponse};
use crate::PARTNER_OPTION_COUNT;

/// Running aggregate of the current iteration's vote responses.
///
/// `participants` here is local to the tally: it counts vote submissions,
/// while the system record counts distinct participants across activities.
/// The two de-duplication scopes are intentionally separate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyRecord {
    /// Iteration currently being collected
    pub iteration: u32,
    /// Vote submissions so far this iteration
    pub participants: u32,
    /// q1: issuance rate running average
    pub issuance_average: f64,
    /// q2: mint fee running average
    pub mint_fee_average: f64,
    /// q3: locking threshold running average (the published result)
    pub locking_threshold_average: f64,
    /// q4: surplus to pool
    pub surplus_pool: u32,
    /// q4: surplus burned
    pub surplus_burn: u32,
    /// q5: reserve release running average
    pub reserve_release_average: f64,
    /// q6: picks per partner option
    pub partner_choices: [u32; PARTNER_OPTION_COUNT],
}

impl TallyRecord {
    pub fn new(iteration: u32) -> Self {
        Self {
            iteration,
            participants: 0,
            issuance_average: 0.0,
            mint_fee_average: 0.0,
            locking_threshold_average: 0.0,
            surplus_pool: 0,
            surplus_burn: 0,
            reserve_release_average: 0.0,
            partner_choices: [0; PARTNER_OPTION_COUNT],
        }
    }

    /// Zero all counters and averages, ready for the new iteration.
    pub fn reset(&mut self, iteration: u32) {
        *self = Self::new(iteration);
    }

    /// Fold one validated response into the running aggregates.
    ///
    /// `new_avg = (old_avg * n + response) / (n + 1)` with n the
    /// pre-increment participant count. f64 throughout; submission order
    /// perturbs rounding but not the mathematical mean.
    pub fn record(&mut self, response: &VoteResponse) {
        let n = self.participants as f64;

        self.issuance_average = (self.issuance_average * n + response.issuance_rate) / (n + 1.0);
        self.mint_fee_average = (self.mint_fee_average * n + response.mint_fee_percent) / (n + 1.0);
        self.locking_threshold_average =
            (self.locking_threshold_average * n + response.locking_threshold) / (n + 1.0);
        self.reserve_release_average =
            (self.reserve_release_average * n + response.reserve_release_percent) / (n + 1.0);

        match response.surplus_allocation {
            SurplusAllocation::Pool => self.surplus_pool += 1,
            SurplusAllocation::Burn => self.surplus_burn += 1,
        }

        for &pick in &response.partners {
            // picks are validated to 1..=6 before record() is reached
            self.partner_choices[(pick - 1) as usize] += 1;
        }

        self.participants += 1;
    }
}

/// Running aggregate of the current iteration's ratification responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatifyRecord {
    /// Iteration currently being collected
    pub iteration: u32,
    /// Ratification submissions so far this iteration
    pub participants: u32,
    /// How many of them approved
    pub ratified: u32,
}

impl RatifyRecord {
    pub fn new(iteration: u32) -> Self {
        Self {
            iteration,
            participants: 0,
            ratified: 0,
        }
    }

    pub fn reset(&mut self, iteration: u32) {
        *self = Self::new(iteration);
    }

    /// Count one ratification response
    pub fn record(&mut self, approve: bool) {
        if approve {
            self.ratified += 1;
        }
        self.participants += 1;
    }
}

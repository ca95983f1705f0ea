//! Participation ledger: rotating 5-slot record per participant
//!
//! Slot for iteration i is `i % SLOT_COUNT`. A slot holds the iteration
//! number in which the activity was last performed; the value matches the
//! queried iteration iff the activity happened in that exact iteration.
//! Iterations 5+ cycles old share slots with current ones and are
//! unrecoverable - this is a bounded-memory window, not a time series.

use serde::{Deserialize, Serialize};

use crate::SLOT_COUNT;

/// The tracked governance activities, in cycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Survey,
    Vote,
    Ratify,
}

impl Activity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Survey => "survey",
            Activity::Vote => "vote",
            Activity::Ratify => "ratify",
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-participant participation record.
///
/// Created lazily on the participant's first action and never deleted;
/// slots are overwritten in place as iterations rotate through them.
/// 0 marks an empty slot, which is why iteration numbers start at 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationRecord {
    survey: [u32; SLOT_COUNT],
    vote: [u32; SLOT_COUNT],
    ratify: [u32; SLOT_COUNT],
}

impl ParticipationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self, activity: Activity) -> &[u32; SLOT_COUNT] {
        match activity {
            Activity::Survey => &self.survey,
            Activity::Vote => &self.vote,
            Activity::Ratify => &self.ratify,
        }
    }

    fn slots_mut(&mut self, activity: Activity) -> &mut [u32; SLOT_COUNT] {
        match activity {
            Activity::Survey => &mut self.survey,
            Activity::Vote => &mut self.vote,
            Activity::Ratify => &mut self.ratify,
        }
    }

    /// Has the activity been performed in exactly this iteration?
    ///
    /// Equality against every slot, not `>=`: only the queried iteration's
    /// completion matters. Iteration 0 is the empty-slot sentinel and is
    /// always "not done".
    pub fn has_done(&self, activity: Activity, iteration: u32) -> bool {
        if iteration == 0 {
            return false;
        }
        self.slots(activity).iter().any(|&slot| slot == iteration)
    }

    /// Record the activity for this iteration, unconditionally overwriting
    /// slot `iteration % SLOT_COUNT`.
    pub fn mark_done(&mut self, activity: Activity, iteration: u32) {
        let slot = (iteration as usize) % SLOT_COUNT;
        self.slots_mut(activity)[slot] = iteration;
    }
}

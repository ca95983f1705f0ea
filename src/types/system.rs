//! System state: the process-wide singleton anchoring tick detection

use serde::{Deserialize, Serialize};

/// Single-row system record.
///
/// `iteration` is the last iteration the transition trigger has processed;
/// `participants` counts distinct participants in the current iteration,
/// de-duplicated across the survey/vote pair. Created once by `init`;
/// its absence from the engine is a deployment error, not a user condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemState {
    /// When the system was initialized (Unix seconds)
    pub init_time: i64,
    /// Last transition-processed iteration number
    pub iteration: u32,
    /// Distinct participants so far in the current iteration
    pub participants: u32,
}

impl SystemState {
    pub fn new(init_time: i64) -> Self {
        Self {
            init_time,
            iteration: 0,
            participants: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_starts_inactive() {
        let sys = SystemState::new(1000);
        assert_eq!(sys.init_time, 1000);
        assert_eq!(sys.iteration, 0);
        assert_eq!(sys.participants, 0);
    }
}

//! Data model: records, responses, errors, snapshots

pub mod activity;
pub mod error;
pub mod snapshot;
pub mod system;
pub mod tally;
pub mod vote;
pub mod window;

pub use activity::{Activity, ParticipationRecord};
pub use error::{GovError, GovResult};
pub use snapshot::{load_snapshot, save_snapshot, IterationSnapshot};
pub use system::SystemState;
pub use tally::{RatifyRecord, TallyRecord};
pub use vote::{SurplusAllocation, VoteResponse};
pub use window::IterationWindow;

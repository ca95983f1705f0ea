//! Engine logic: calendar resolution, parameters, collaborator seams, lifecycle

pub mod calendar;
pub mod engine;
pub mod oracle;
pub mod params;

pub use calendar::Calendar;
pub use engine::GovEngine;
pub use oracle::{
    EligibilityOracle, PriceOracle, RecordingPublisher, Roster, SharedPrice, SharedRoster,
    TargetPublisher,
};
pub use params::{parse_vote_ranges, MemoryParams, ParameterStore, SharedParams, VoteRanges};

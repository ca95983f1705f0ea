//! Collaborator seams: eligibility, price feed, and the outbound publisher
//!
//! The engine consumes these through narrow traits. The implementations
//! here are in-process stand-ins built on shared handles, so the CLI and
//! tests keep a mutable view after handing the collaborator to the engine.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Who may participate, and at what level
pub trait EligibilityOracle {
    fn is_registered(&self, participant: &str) -> bool;
    fn is_staked(&self, participant: &str) -> bool;
    fn is_verified(&self, participant: &str) -> bool;
}

/// Current exchange-rate signal
pub trait PriceOracle {
    /// None when the host has not published a price yet
    fn current_price(&self) -> Option<f64>;
}

/// Outbound "set target rate" call. Fire-and-forget: the engine never
/// waits on or inspects the result.
pub trait TargetPublisher {
    fn publish_target(&mut self, iteration: u32, rate: f64);
}

// =============================================================================
// IN-PROCESS IMPLEMENTATIONS
// =============================================================================

/// Membership roster with three eligibility tiers
#[derive(Debug, Clone, Default)]
pub struct Roster {
    registered: HashSet<String>,
    staked: HashSet<String>,
    verified: HashSet<String>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant, optionally staked and verified
    pub fn add(&mut self, participant: &str, staked: bool, verified: bool) {
        self.registered.insert(participant.to_string());
        if staked {
            self.staked.insert(participant.to_string());
        }
        if verified {
            self.verified.insert(participant.to_string());
        }
    }
}

impl EligibilityOracle for Roster {
    fn is_registered(&self, participant: &str) -> bool {
        self.registered.contains(participant)
    }

    fn is_staked(&self, participant: &str) -> bool {
        self.staked.contains(participant)
    }

    fn is_verified(&self, participant: &str) -> bool {
        self.verified.contains(participant)
    }
}

/// Shared handle to a roster
#[derive(Debug, Clone, Default)]
pub struct SharedRoster(pub Rc<RefCell<Roster>>);

impl SharedRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, participant: &str, staked: bool, verified: bool) {
        self.0.borrow_mut().add(participant, staked, verified);
    }
}

impl EligibilityOracle for SharedRoster {
    fn is_registered(&self, participant: &str) -> bool {
        self.0.borrow().is_registered(participant)
    }

    fn is_staked(&self, participant: &str) -> bool {
        self.0.borrow().is_staked(participant)
    }

    fn is_verified(&self, participant: &str) -> bool {
        self.0.borrow().is_verified(participant)
    }
}

/// Settable price feed behind a shared handle
#[derive(Debug, Clone, Default)]
pub struct SharedPrice(pub Rc<RefCell<Option<f64>>>);

impl SharedPrice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(price: f64) -> Self {
        Self(Rc::new(RefCell::new(Some(price))))
    }

    pub fn set(&self, price: f64) {
        *self.0.borrow_mut() = Some(price);
    }
}

impl PriceOracle for SharedPrice {
    fn current_price(&self) -> Option<f64> {
        *self.0.borrow()
    }
}

/// Publisher that records every outbound target-rate call
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    log: Rc<RefCell<Vec<(u32, f64)>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// All (iteration, rate) pairs published so far
    pub fn published(&self) -> Vec<(u32, f64)> {
        self.log.borrow().clone()
    }
}

impl TargetPublisher for RecordingPublisher {
    fn publish_target(&mut self, iteration: u32, rate: f64) {
        self.log.borrow_mut().push((iteration, rate));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_tiers() {
        let mut roster = Roster::new();
        roster.add("alice", true, false);
        roster.add("bob", false, true);

        assert!(roster.is_registered("alice"));
        assert!(roster.is_staked("alice"));
        assert!(!roster.is_verified("alice"));

        assert!(roster.is_registered("bob"));
        assert!(!roster.is_staked("bob"));
        assert!(roster.is_verified("bob"));

        assert!(!roster.is_registered("mallory"));
    }

    #[test]
    fn test_shared_roster_sees_later_additions() {
        let shared = SharedRoster::new();
        let handle = shared.clone();
        handle.add("carol", true, true);
        assert!(shared.is_registered("carol"));
    }

    #[test]
    fn test_shared_price_starts_unset() {
        let price = SharedPrice::new();
        assert_eq!(price.current_price(), None);
        price.set(0.03);
        assert_eq!(price.current_price(), Some(0.03));
    }

    #[test]
    fn test_recording_publisher_log() {
        let publisher = RecordingPublisher::new();
        let mut sink: Box<dyn TargetPublisher> = Box::new(publisher.clone());
        sink.publish_target(2, 0.021);
        assert_eq!(publisher.published(), vec![(2, 0.021)]);
    }
}

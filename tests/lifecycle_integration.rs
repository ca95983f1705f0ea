//! Integration tests for the iteration lifecycle
//!
//! Tests the full path: calendar → tick → transition trigger → snapshot,
//! including the quorum gate on publishing and the lazy (call-driven)
//! transition model.

use govcycle::core::{Calendar, GovEngine, RecordingPublisher, SharedParams, SharedPrice, SharedRoster};
use govcycle::types::snapshot::load_snapshot;
use govcycle::types::{GovError, IterationWindow, SurplusAllocation, VoteResponse};
use govcycle::{PARAM_LOCK_FACTOR, PARAM_LOCK_QUORUM};

fn build_engine(quorum: &str) -> (GovEngine, SharedRoster, RecordingPublisher, SharedParams) {
    let mut calendar = Calendar::new();
    calendar.add_window(IterationWindow::new(1, 100, 199)).unwrap();
    calendar.add_window(IterationWindow::new(2, 200, 299)).unwrap();
    calendar.add_window(IterationWindow::new(3, 300, 399)).unwrap();

    let params = SharedParams::new();
    {
        let mut p = params.0.borrow_mut();
        p.upsert_string(PARAM_LOCK_QUORUM, quorum);
        p.upsert_f64(PARAM_LOCK_FACTOR, 3.0);
    }

    let roster = SharedRoster::new();
    let publisher = RecordingPublisher::new();
    let engine = GovEngine::new(
        calendar,
        Box::new(params.clone()),
        Box::new(roster.clone()),
        Box::new(SharedPrice::with_price(2.0)),
        Box::new(publisher.clone()),
    );
    (engine, roster, publisher, params)
}

fn ballot(q3: f64) -> VoteResponse {
    VoteResponse {
        issuance_rate: 50.0,
        mint_fee_percent: 10.0,
        locking_threshold: q3,
        surplus_allocation: SurplusAllocation::Pool,
        reserve_release_percent: 20.0,
        partners: vec![1],
    }
}

// =============================================================================
// SCENARIO 1: Full two-iteration walkthrough
// =============================================================================

#[test]
fn test_two_iteration_walkthrough() {
    let (mut engine, roster, publisher, _) = build_engine("1");
    roster.add("alice", true, true);

    // Before init, every entry point is a deployment error
    let err = engine.tick(150).unwrap_err();
    assert!(err.is_fatal());

    engine.init(50);
    assert_eq!(engine.system().unwrap().iteration, 0);

    // A vote at t=150 lazily transitions 0 -> 1, then records
    engine.submit_vote("alice", &ballot(5.0), 150).unwrap();
    assert_eq!(engine.system().unwrap().iteration, 1);
    assert_eq!(engine.tally().unwrap().participants, 1);
    assert!((engine.tally().unwrap().locking_threshold_average - 5.0).abs() < 1e-9);

    // The 0 -> 1 transition closed no cycle
    assert!(engine.snapshots().is_empty());
    assert!(publisher.published().is_empty());

    // First touch after the boundary closes iteration 1
    engine.tick(250).unwrap();
    assert_eq!(engine.system().unwrap().iteration, 2);
    assert_eq!(publisher.published(), vec![(1, 5.0)]);

    let snap = &engine.snapshots()[0];
    assert_eq!(snap.iteration, 1);
    assert_eq!(snap.vote_participants, 1);
    assert!(snap.quorum_met);

    // Records are primed for iteration 2
    assert_eq!(engine.tally().unwrap().iteration, 2);
    assert_eq!(engine.tally().unwrap().participants, 0);
    assert_eq!(engine.system().unwrap().participants, 0);
}

#[test]
fn test_submission_itself_triggers_the_transition() {
    let (mut engine, roster, publisher, _) = build_engine("1");
    roster.add("alice", true, false);

    engine.init(50);
    engine.submit_vote("alice", &ballot(4.0), 150).unwrap();

    // No explicit tick: the vote at t=250 closes iteration 1 first,
    // then lands in iteration 2
    engine.submit_vote("alice", &ballot(2.0), 250).unwrap();

    assert_eq!(publisher.published(), vec![(1, 4.0)]);
    assert_eq!(engine.tally().unwrap().iteration, 2);
    assert_eq!(engine.tally().unwrap().participants, 1);
    assert!((engine.tally().unwrap().locking_threshold_average - 2.0).abs() < 1e-9);
}

// =============================================================================
// SCENARIO 2: Quorum gate
// =============================================================================

#[test]
fn test_below_quorum_holds_the_result() {
    let (mut engine, roster, publisher, _) = build_engine("3");
    roster.add("alice", true, false);

    engine.init(50);
    engine.submit_vote("alice", &ballot(5.0), 150).unwrap();
    engine.tick(250).unwrap();

    // One vote against quorum 3: nothing published, snapshot says so
    assert!(publisher.published().is_empty());
    let snap = &engine.snapshots()[0];
    assert!(!snap.quorum_met);
    assert_eq!(snap.quorum, 3);
    assert_eq!(snap.published_target, None);

    // The tally still resets; below-quorum results are simply dropped
    assert_eq!(engine.tally().unwrap().participants, 0);
}

#[test]
fn test_missing_quorum_parameter_aborts_transition() {
    let (mut engine, _, _, params) = build_engine("1");
    engine.init(50);
    engine.tick(150).unwrap();

    params.0.borrow_mut().erase_string(PARAM_LOCK_QUORUM);
    let err = engine.tick(250).unwrap_err();
    assert_eq!(err, GovError::MissingParameter(PARAM_LOCK_QUORUM.to_string()));
}

#[test]
fn test_unparsable_quorum_parameter_aborts_transition() {
    let (mut engine, _, _, params) = build_engine("1");
    engine.init(50);
    engine.tick(150).unwrap();

    params.0.borrow_mut().upsert_string(PARAM_LOCK_QUORUM, "many");
    let err = engine.tick(250).unwrap_err();
    assert!(matches!(err, GovError::InvalidParameter { .. }));
}

// =============================================================================
// SCENARIO 3: Calendar gaps and inactive periods
// =============================================================================

#[test]
fn test_gap_between_windows_goes_inactive() {
    let (mut engine, roster, _, _) = build_engine("1");
    roster.add("alice", true, false);
    engine.init(50);
    engine.submit_vote("alice", &ballot(5.0), 150).unwrap();

    // t=650 is past every window: the touch closes the last active
    // iteration and the system resolves to 0
    engine.tick(650).unwrap();
    assert_eq!(engine.system().unwrap().iteration, 0);
    assert_eq!(engine.current_iteration(650), 0);

    // Submissions during the inactive period are rejected
    let err = engine.submit_vote("alice", &ballot(5.0), 650).unwrap_err();
    assert_eq!(err, GovError::SystemInactive);
}

#[test]
fn test_inclusive_window_boundaries() {
    let (mut engine, roster, _, _) = build_engine("1");
    roster.add("alice", true, false);
    engine.init(50);

    // Both endpoints of window 1 accept submissions
    engine.submit_vote("alice", &ballot(1.0), 100).unwrap();
    engine.submit_survey("alice", 199).unwrap();
    assert_eq!(engine.system().unwrap().iteration, 1);
}

// =============================================================================
// SCENARIO 4: Snapshot persistence
// =============================================================================

#[test]
fn test_snapshot_saved_and_reloaded_with_valid_digest() {
    let dir = std::env::temp_dir().join(format!("govcycle_it_{}", std::process::id()));
    let dir = dir.to_string_lossy().to_string();

    let (engine, roster, _, _) = build_engine("1");
    let mut engine = engine.with_snapshot_dir(&dir);
    roster.add("alice", true, false);

    engine.init(50);
    engine.submit_vote("alice", &ballot(5.0), 150).unwrap();
    engine.tick(250).unwrap();

    let snap = &engine.snapshots()[0];
    let path = format!("{}/{}.json", dir, snap.id);
    let restored = load_snapshot(&path).unwrap();
    assert_eq!(&restored, snap);
    assert!(restored.digest_valid());

    std::fs::remove_dir_all(&dir).ok();
}

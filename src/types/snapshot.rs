//! Iteration snapshots: frozen results of a closed governance cycle
//!
//! A snapshot is taken by the transition trigger just before the tally is
//! reset. The digest covers the result payload, so a stored snapshot can be
//! checked for tampering when loaded back.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::error::{GovError, GovResult};
use crate::types::tally::{RatifyRecord, TallyRecord};
use crate::PARTNER_OPTION_COUNT;

/// Frozen aggregate results of one closed iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationSnapshot {
    /// Identifier: `iter_<number>_<UTC timestamp>`
    pub id: String,
    /// When the snapshot was taken (Unix seconds)
    pub timestamp_unix: i64,
    /// The iteration that was closed
    pub iteration: u32,
    /// Vote submissions in the closed iteration
    pub vote_participants: u32,
    /// Distinct participants across activities (system counter)
    pub distinct_participants: u32,
    /// q1 final running average
    pub issuance_average: f64,
    /// q2 final running average
    pub mint_fee_average: f64,
    /// q3 final running average (the publishable result)
    pub locking_threshold_average: f64,
    /// q4 final counters
    pub surplus_pool: u32,
    pub surplus_burn: u32,
    /// q5 final running average
    pub reserve_release_average: f64,
    /// q6 final counters
    pub partner_choices: [u32; PARTNER_OPTION_COUNT],
    /// Ratification results
    pub ratify_participants: u32,
    pub ratified: u32,
    /// Quorum that applied to this iteration
    pub quorum: u32,
    /// Whether the vote participant count met the quorum
    pub quorum_met: bool,
    /// The target rate sent to the publisher, if quorum was met
    pub published_target: Option<f64>,
    /// SHA-256 over the serialized result payload
    pub digest: [u8; 32],
}

impl IterationSnapshot {
    /// Capture the closed iteration's records.
    ///
    /// Call before the tally/ratify records are reset.
    pub fn capture(
        tally: &TallyRecord,
        ratify: &RatifyRecord,
        distinct_participants: u32,
        quorum: u32,
        published_target: Option<f64>,
        now: i64,
    ) -> GovResult<Self> {
        let id = format!(
            "iter_{:04}_{}",
            tally.iteration,
            chrono::DateTime::from_timestamp(now, 0)
                .unwrap_or_default()
                .format("%Y%m%d_%H%M%S")
        );

        let mut snapshot = Self {
            id,
            timestamp_unix: now,
            iteration: tally.iteration,
            vote_participants: tally.participants,
            distinct_participants,
            issuance_average: tally.issuance_average,
            mint_fee_average: tally.mint_fee_average,
            locking_threshold_average: tally.locking_threshold_average,
            surplus_pool: tally.surplus_pool,
            surplus_burn: tally.surplus_burn,
            reserve_release_average: tally.reserve_release_average,
            partner_choices: tally.partner_choices,
            ratify_participants: ratify.participants,
            ratified: ratify.ratified,
            quorum,
            quorum_met: tally.participants >= quorum,
            published_target,
            digest: [0u8; 32],
        };
        snapshot.digest = snapshot.compute_digest()?;
        Ok(snapshot)
    }

    /// Digest of the payload with the digest field zeroed
    pub fn compute_digest(&self) -> GovResult<[u8; 32]> {
        let mut payload = self.clone();
        payload.digest = [0u8; 32];
        // Field order is fixed by the struct, so the JSON bytes are stable
        let bytes = serde_json::to_vec(&payload)
            .map_err(|e| GovError::SnapshotSerialize(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let result = hasher.finalize();
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&result);
        Ok(digest)
    }

    /// Does the stored digest match the payload? An unserializable payload
    /// can match nothing.
    pub fn digest_valid(&self) -> bool {
        self.compute_digest()
            .map_or(false, |digest| self.digest == digest)
    }
}

/// Save a snapshot as pretty JSON under `dir`, returning the file path
pub fn save_snapshot(snapshot: &IterationSnapshot, dir: &str) -> GovResult<String> {
    let filename = format!("{}/{}.json", dir, snapshot.id);

    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| GovError::SnapshotSerialize(e.to_string()))?;

    std::fs::create_dir_all(dir).map_err(|e| GovError::SnapshotStorage(e.to_string()))?;
    std::fs::write(&filename, json).map_err(|e| GovError::SnapshotStorage(e.to_string()))?;

    Ok(filename)
}

/// Load a snapshot from a JSON file and verify its digest
pub fn load_snapshot(path: &str) -> GovResult<IterationSnapshot> {
    let json =
        std::fs::read_to_string(path).map_err(|e| GovError::SnapshotStorage(e.to_string()))?;

    let snapshot: IterationSnapshot =
        serde_json::from_str(&json).map_err(|e| GovError::SnapshotSerialize(e.to_string()))?;

    if !snapshot.digest_valid() {
        return Err(GovError::SnapshotStorage(format!(
            "digest mismatch in {}",
            path
        )));
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IterationSnapshot {
        let mut tally = TallyRecord::new(3);
        tally.participants = 4;
        tally.locking_threshold_average = 0.021;
        let mut ratify = RatifyRecord::new(3);
        ratify.record(true);
        IterationSnapshot::capture(&tally, &ratify, 5, 3, Some(0.021), 1_700_000_000).unwrap()
    }

    #[test]
    fn test_capture_copies_results() {
        let snap = sample();
        assert_eq!(snap.iteration, 3);
        assert_eq!(snap.vote_participants, 4);
        assert_eq!(snap.distinct_participants, 5);
        assert!(snap.quorum_met);
        assert_eq!(snap.published_target, Some(0.021));
        assert!(snap.id.starts_with("iter_0003_"));
    }

    #[test]
    fn test_quorum_not_met() {
        let tally = TallyRecord::new(2);
        let ratify = RatifyRecord::new(2);
        let snap = IterationSnapshot::capture(&tally, &ratify, 0, 1, None, 0).unwrap();
        assert!(!snap.quorum_met);
        assert_eq!(snap.published_target, None);
    }

    #[test]
    fn test_digest_is_valid_and_detects_tampering() {
        let mut snap = sample();
        assert!(snap.digest_valid());

        snap.locking_threshold_average = 99.0;
        assert!(!snap.digest_valid());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let snap = sample();
        let dir = std::env::temp_dir().join(format!("govcycle_snap_{}", std::process::id()));
        let dir = dir.to_string_lossy().to_string();

        let path = save_snapshot(&snap, &dir).unwrap();
        let restored = load_snapshot(&path).unwrap();
        assert_eq!(restored, snap);

        std::fs::remove_dir_all(&dir).ok();
    }
}

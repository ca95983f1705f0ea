//! Governance engine: init, tick, transition trigger, submissions
//!
//! Execution model: discrete, serial, run-to-completion entry points. Every
//! mutating entry point ticks first; the transition trigger therefore fires
//! on the first touch after a calendar boundary, never from a timer. All
//! precondition checks precede aggregate mutation, so a failed submission
//! leaves the tally and ledgers untouched.

use std::collections::HashMap;

use crate::core::calendar::Calendar;
use crate::core::oracle::{EligibilityOracle, PriceOracle, TargetPublisher};
use crate::core::params::{parse_vote_ranges, ParameterStore};
use crate::types::activity::{Activity, ParticipationRecord};
use crate::types::error::{GovError, GovResult};
use crate::types::snapshot::{save_snapshot, IterationSnapshot};
use crate::types::system::SystemState;
use crate::types::tally::{RatifyRecord, TallyRecord};
use crate::types::vote::VoteResponse;
use crate::types::window::IterationWindow;
use crate::{
    DEFAULT_VOTE_RANGES, HARD_PRICE_FLOOR, MAX_PARTNER_PICKS, PARAM_LOCK_FACTOR,
    PARAM_LOCK_QUORUM, PARAM_VOTE_RANGES, PARTNER_OPTION_COUNT,
};

/// The governance lifecycle engine.
///
/// Owns the singleton records and the per-participant ledger; consumes the
/// calendar, parameters, eligibility, price, and publisher collaborators
/// through their seams.
pub struct GovEngine {
    calendar: Calendar,
    params: Box<dyn ParameterStore>,
    eligibility: Box<dyn EligibilityOracle>,
    price: Box<dyn PriceOracle>,
    publisher: Box<dyn TargetPublisher>,
    snapshot_dir: Option<String>,

    system: Option<SystemState>,
    tally: Option<TallyRecord>,
    ratify: Option<RatifyRecord>,
    participation: HashMap<String, ParticipationRecord>,
    snapshots: Vec<IterationSnapshot>,
}

impl GovEngine {
    pub fn new(
        calendar: Calendar,
        params: Box<dyn ParameterStore>,
        eligibility: Box<dyn EligibilityOracle>,
        price: Box<dyn PriceOracle>,
        publisher: Box<dyn TargetPublisher>,
    ) -> Self {
        Self {
            calendar,
            params,
            eligibility,
            price,
            publisher,
            snapshot_dir: None,
            system: None,
            tally: None,
            ratify: None,
            participation: HashMap::new(),
            snapshots: Vec::new(),
        }
    }

    /// Also persist every iteration snapshot as JSON under `dir`
    pub fn with_snapshot_dir(mut self, dir: &str) -> Self {
        self.snapshot_dir = Some(dir.to_string());
        self
    }

    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Create the singleton records, or refresh `init_time` if they exist.
    ///
    /// Every other entry point fails with the record-undefined class until
    /// this has run once.
    pub fn init(&mut self, now: i64) {
        match self.system.as_mut() {
            Some(sys) => sys.init_time = now,
            None => self.system = Some(SystemState::new(now)),
        }

        let iteration = self.calendar.resolve(now);
        if self.tally.is_none() {
            self.tally = Some(TallyRecord::new(iteration));
        }
        if self.ratify.is_none() {
            self.ratify = Some(RatifyRecord::new(iteration));
        }
    }

    // =========================================================================
    // TICK / TRANSITION
    // =========================================================================

    /// Detect an iteration change and run the transition trigger.
    ///
    /// Idempotent within a resolved iteration; called at the top of every
    /// mutating entry point and callable directly by the host.
    pub fn tick(&mut self, now: i64) -> GovResult<()> {
        let old = self
            .system
            .as_ref()
            .ok_or(GovError::MissingRecord("system"))?
            .iteration;
        let new = self.calendar.resolve(now);

        if new != old {
            self.on_advance(new, now)?;
            if let Some(sys) = self.system.as_mut() {
                sys.iteration = new;
            }
        }

        Ok(())
    }

    /// Close out the old iteration and prime the new one.
    ///
    /// Iteration 1 is the first-ever active iteration: there is no prior
    /// cycle, so nothing is snapshotted or published. Every other advance
    /// captures a snapshot, publishes the locking threshold when the vote
    /// count met quorum, and resets the tally records in place.
    fn on_advance(&mut self, new_iteration: u32, now: i64) -> GovResult<()> {
        if new_iteration != 1 {
            let tally = self
                .tally
                .as_ref()
                .ok_or(GovError::MissingRecord("vote"))?
                .clone();
            let ratify = self
                .ratify
                .as_ref()
                .ok_or(GovError::MissingRecord("ratify"))?
                .clone();

            let quorum_raw = self
                .params
                .get_string(PARAM_LOCK_QUORUM)
                .ok_or_else(|| GovError::MissingParameter(PARAM_LOCK_QUORUM.to_string()))?;
            let quorum: u32 =
                quorum_raw
                    .trim()
                    .parse()
                    .map_err(|_| GovError::InvalidParameter {
                        key: PARAM_LOCK_QUORUM.to_string(),
                        value: quorum_raw.clone(),
                    })?;

            // Publish the result before resetting; fire-and-forget
            let published = if tally.participants >= quorum {
                let rate = tally.locking_threshold_average;
                self.publisher.publish_target(tally.iteration, rate);
                Some(rate)
            } else {
                None
            };

            let distinct = self.system.as_ref().map(|s| s.participants).unwrap_or(0);
            let snapshot =
                IterationSnapshot::capture(&tally, &ratify, distinct, quorum, published, now)?;
            if let Some(dir) = &self.snapshot_dir {
                save_snapshot(&snapshot, dir)?;
            }
            self.snapshots.push(snapshot);
        }

        if let Some(tally) = self.tally.as_mut() {
            tally.reset(new_iteration);
        }
        if let Some(ratify) = self.ratify.as_mut() {
            ratify.reset(new_iteration);
        }
        if let Some(sys) = self.system.as_mut() {
            sys.participants = 0;
        }

        Ok(())
    }

    // =========================================================================
    // SUBMISSIONS
    // =========================================================================

    /// Record a survey completion.
    ///
    /// The survey aggregate itself was retired; what remains is the
    /// participation slot and the distinct-participant count.
    pub fn submit_survey(&mut self, participant: &str, now: i64) -> GovResult<()> {
        self.tick(now)?;

        if !self.eligibility.is_registered(participant) {
            return Err(GovError::NotRegistered);
        }

        let iteration = self.calendar.resolve(now);
        if iteration == 0 {
            return Err(GovError::SystemInactive);
        }

        if self.has_done(participant, Activity::Survey, iteration) {
            return Err(GovError::AlreadyCompleted(Activity::Survey));
        }

        self.participation
            .entry(participant.to_string())
            .or_default()
            .mark_done(Activity::Survey, iteration);

        // The de-dup check lives on the vote side only; a surveyor is
        // always newly counted here.
        if let Some(sys) = self.system.as_mut() {
            sys.participants += 1;
        }

        Ok(())
    }

    /// Submit a vote. Preconditions in order, first failure wins; no state
    /// changes beyond the tick until every check has passed.
    pub fn submit_vote(
        &mut self,
        participant: &str,
        response: &VoteResponse,
        now: i64,
    ) -> GovResult<()> {
        self.tick(now)?;

        if !self.eligibility.is_registered(participant) {
            return Err(GovError::NotRegistered);
        }
        if !self.eligibility.is_staked(participant) {
            return Err(GovError::NotStaked);
        }

        let iteration = self.calendar.resolve(now);
        if iteration == 0 {
            return Err(GovError::SystemInactive);
        }

        if self.has_done(participant, Activity::Vote, iteration) {
            return Err(GovError::AlreadyCompleted(Activity::Vote));
        }

        // q1/q2/q5 against the configured slider ranges
        let ranges_raw = self
            .params
            .get_string(PARAM_VOTE_RANGES)
            .unwrap_or_else(|| DEFAULT_VOTE_RANGES.to_string());
        let ranges = parse_vote_ranges(&ranges_raw)?;
        check_range("issuance rate", response.issuance_rate, ranges.issuance)?;
        check_range("mint fee", response.mint_fee_percent, ranges.mint_fee)?;
        check_range(
            "reserve release",
            response.reserve_release_percent,
            ranges.reserve_release,
        )?;

        // q3 against the price-derived bound
        let price = self.price.current_price().ok_or(GovError::PriceUnavailable)?;
        let lock_factor = self
            .params
            .get_f64(PARAM_LOCK_FACTOR)
            .ok_or_else(|| GovError::MissingParameter(PARAM_LOCK_FACTOR.to_string()))?;
        let upper = lock_factor * price.max(HARD_PRICE_FLOOR);
        if response.locking_threshold < HARD_PRICE_FLOOR || response.locking_threshold > upper {
            return Err(GovError::OutOfRange {
                field: "locking threshold",
                lower: HARD_PRICE_FLOOR,
                upper,
            });
        }

        validate_partners(&response.partners)?;

        // All preconditions hold - fold into the aggregates
        self.tally
            .as_mut()
            .ok_or(GovError::MissingRecord("vote"))?
            .record(response);

        let record = self.participation.entry(participant.to_string()).or_default();
        let already_counted = record.has_done(Activity::Survey, iteration);
        record.mark_done(Activity::Vote, iteration);

        if !already_counted {
            if let Some(sys) = self.system.as_mut() {
                sys.participants += 1;
            }
        }

        Ok(())
    }

    /// Submit a ratification response. Requires a same-iteration vote; never
    /// changes the distinct-participant count (the voter is already counted).
    pub fn submit_ratify(&mut self, participant: &str, approve: bool, now: i64) -> GovResult<()> {
        self.tick(now)?;

        if !self.eligibility.is_registered(participant) {
            return Err(GovError::NotRegistered);
        }
        if !self.eligibility.is_verified(participant) {
            return Err(GovError::NotVerified);
        }

        let iteration = self.calendar.resolve(now);
        if iteration == 0 {
            return Err(GovError::SystemInactive);
        }

        if !self.has_done(participant, Activity::Vote, iteration) {
            return Err(GovError::VoteRequired);
        }
        if self.has_done(participant, Activity::Ratify, iteration) {
            return Err(GovError::AlreadyCompleted(Activity::Ratify));
        }

        self.ratify
            .as_mut()
            .ok_or(GovError::MissingRecord("ratify"))?
            .record(approve);

        self.participation
            .entry(participant.to_string())
            .or_default()
            .mark_done(Activity::Ratify, iteration);

        Ok(())
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Which iteration does the calendar resolve `now` to?
    pub fn current_iteration(&self, now: i64) -> u32 {
        self.calendar.resolve(now)
    }

    /// Add a window to the iteration calendar
    pub fn add_window(&mut self, window: IterationWindow) -> GovResult<()> {
        self.calendar.add_window(window)
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn system(&self) -> Option<&SystemState> {
        self.system.as_ref()
    }

    pub fn tally(&self) -> Option<&TallyRecord> {
        self.tally.as_ref()
    }

    pub fn ratify_record(&self) -> Option<&RatifyRecord> {
        self.ratify.as_ref()
    }

    pub fn participation(&self, participant: &str) -> Option<&ParticipationRecord> {
        self.participation.get(participant)
    }

    /// Snapshots of closed iterations, oldest first
    pub fn snapshots(&self) -> &[IterationSnapshot] {
        &self.snapshots
    }

    fn has_done(&self, participant: &str, activity: Activity, iteration: u32) -> bool {
        self.participation
            .get(participant)
            .map_or(false, |rec| rec.has_done(activity, iteration))
    }
}

/// Inclusive range check naming the bounds on failure
fn check_range(field: &'static str, value: f64, (lower, upper): (f64, f64)) -> GovResult<()> {
    if value < lower || value > upper {
        return Err(GovError::OutOfRange {
            field,
            lower,
            upper,
        });
    }
    Ok(())
}

/// Partner picks: each 1..=6, at most three, no duplicates
fn validate_partners(partners: &[u8]) -> GovResult<()> {
    if partners.len() > MAX_PARTNER_PICKS {
        return Err(GovError::InvalidPartnerChoice(format!(
            "at most {} picks allowed, got {}",
            MAX_PARTNER_PICKS,
            partners.len()
        )));
    }
    for (i, &pick) in partners.iter().enumerate() {
        if pick < 1 || pick as usize > PARTNER_OPTION_COUNT {
            return Err(GovError::InvalidPartnerChoice(format!(
                "pick {} is not a partner option (1-{})",
                pick, PARTNER_OPTION_COUNT
            )));
        }
        if partners[..i].contains(&pick) {
            return Err(GovError::InvalidPartnerChoice(format!(
                "pick {} appears more than once",
                pick
            )));
        }
    }
    Ok(())
}

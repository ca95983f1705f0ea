//! Parameter store seam and the voteranges grammar
//!
//! The host keeps governance configuration in two key-value tables (string
//! and double). This core only consumes them through the `ParameterStore`
//! trait; `MemoryParams` is the in-process implementation used by the CLI
//! and tests, with upsert/erase mirroring the host's config actions.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::error::{GovError, GovResult};

/// Read-only view of the host's parameter tables
pub trait ParameterStore {
    fn get_string(&self, key: &str) -> Option<String>;
    fn get_f64(&self, key: &str) -> Option<f64>;
}

/// In-memory parameter tables
#[derive(Debug, Clone, Default)]
pub struct MemoryParams {
    strings: HashMap<String, String>,
    doubles: HashMap<String, f64>,
}

impl MemoryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a string parameter
    pub fn upsert_string(&mut self, key: &str, value: &str) {
        self.strings.insert(key.to_string(), value.to_string());
    }

    /// Insert or replace a double parameter
    pub fn upsert_f64(&mut self, key: &str, value: f64) {
        self.doubles.insert(key.to_string(), value);
    }

    /// Remove a string parameter
    pub fn erase_string(&mut self, key: &str) {
        self.strings.remove(key);
    }

    /// Remove a double parameter
    pub fn erase_f64(&mut self, key: &str) {
        self.doubles.remove(key);
    }
}

impl ParameterStore for MemoryParams {
    fn get_string(&self, key: &str) -> Option<String> {
        self.strings.get(key).cloned()
    }

    fn get_f64(&self, key: &str) -> Option<f64> {
        self.doubles.get(key).copied()
    }
}

/// Shared handle to a `MemoryParams`, so the CLI can keep upserting
/// parameters after handing the store to the engine.
#[derive(Debug, Clone, Default)]
pub struct SharedParams(pub Rc<RefCell<MemoryParams>>);

impl SharedParams {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParameterStore for SharedParams {
    fn get_string(&self, key: &str) -> Option<String> {
        self.0.borrow().get_string(key)
    }

    fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.borrow().get_f64(key)
    }
}

// =============================================================================
// VOTERANGES GRAMMAR
// =============================================================================

lazy_static! {
    // The voteranges string looks like: q1:0-100,q2:6-30,q5:0-50
    static ref RE_VOTE_RANGES: Regex = Regex::new(
        r"^q1:(\d+)-(\d+),q2:(\d+)-(\d+),q5:(\d+)-(\d+)$"
    ).unwrap();
}

/// Slider bounds for the statically-ranged questions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteRanges {
    /// q1: issuance rate bounds
    pub issuance: (f64, f64),
    /// q2: mint fee bounds
    pub mint_fee: (f64, f64),
    /// q5: reserve release bounds
    pub reserve_release: (f64, f64),
}

/// Parse a voteranges parameter value
pub fn parse_vote_ranges(raw: &str) -> GovResult<VoteRanges> {
    let caps = RE_VOTE_RANGES
        .captures(raw.trim())
        .ok_or_else(|| GovError::InvalidParameter {
            key: crate::PARAM_VOTE_RANGES.to_string(),
            value: raw.to_string(),
        })?;

    // Captures are digit-only by construction, so parsing cannot fail
    let num = |i: usize| caps[i].parse::<f64>().unwrap_or_default();

    Ok(VoteRanges {
        issuance: (num(1), num(2)),
        mint_fee: (num(3), num(4)),
        reserve_release: (num(5), num(6)),
    })
}

//! OpenSky API credit bookkeeping.
//!
//! The public API meters usage in daily credits; a states query costs
//! between 1 and 4 credits depending on the queried area. The ledger only
//! keeps an estimate for the caller, it never blocks a request.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use opensky_models::BoundingBox;

/// Daily budget of an anonymous client.
pub const ANONYMOUS_CREDITS: u32 = 400;
/// Daily budget of an authenticated user.
pub const AUTHENTICATED_CREDITS: u32 = 4000;
/// Daily budget of a user contributing a receiver to the network.
pub const CONTRIBUTING_CREDITS: u32 = 8000;

/// Cost of a states query over `bounding_box` (`None` is the whole world).
///
/// | area (sq. degrees) | credits |
/// |--------------------|---------|
/// | < 25               | 1       |
/// | < 100              | 2       |
/// | < 400              | 3       |
/// | otherwise          | 4       |
pub fn credit_cost(bounding_box: Option<&BoundingBox>) -> u32 {
    let Some(bbox) = bounding_box else {
        return 4;
    };
    let area = bbox.area();
    if area < 25.0 {
        1
    } else if area < 100.0 {
        2
    } else if area < 400.0 {
        3
    } else {
        4
    }
}

/// Credits spent over a sliding 24 hour window.
#[derive(Debug)]
pub struct CreditLedger {
    budget: u32,
    usage: Mutex<Vec<(DateTime<Utc>, u32)>>,
}

impl CreditLedger {
    /// Empty ledger with the given daily budget.
    pub fn new(budget: u32) -> Self {
        Self {
            budget,
            usage: Mutex::new(Vec::new()),
        }
    }

    /// The daily budget.
    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Change the daily budget, keeping recorded usage.
    pub fn set_budget(&mut self, budget: u32) {
        self.budget = budget;
    }

    /// Record `credits` spent now.
    pub fn register(&self, credits: u32) {
        self.register_at(Utc::now(), credits);
    }

    /// Record `credits` spent at `at`, dropping entries older than a day.
    pub fn register_at(&self, at: DateTime<Utc>, credits: u32) {
        let mut usage = self.usage.lock().unwrap_or_else(|e| e.into_inner());
        usage.retain(|(t, _)| at - *t <= Duration::hours(24));
        usage.push((at, credits));
    }

    /// Estimated credits left now.
    pub fn remaining(&self) -> i64 {
        self.remaining_at(Utc::now())
    }

    /// Estimated credits left at `now`.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> i64 {
        let usage = self.usage.lock().unwrap_or_else(|e| e.into_inner());
        let window_start = now - Duration::hours(24);
        let used: i64 = usage
            .iter()
            .filter(|(t, _)| window_start <= *t && *t <= now)
            .map(|(_, c)| i64::from(*c))
            .sum();
        i64::from(self.budget) - used
    }
}

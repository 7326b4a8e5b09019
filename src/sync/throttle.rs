/// API throttling policy.
///
/// Caps how many days one run may fetch, so that a long outage (or the very
/// first run) drains its backlog over several runs instead of tripping the
/// provider's rate limiter in one burst.

use crate::alert::ErrorEvent;
use crate::config::ConfigError;
use crate::model::ObservationDate;
use chrono::Days;
use std::str::FromStr;

/// Maximum look-back window in days. Fractional values are allowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleLimit(f64);

impl ThrottleLimit {
    pub fn new(days: f64) -> Option<Self> {
        (days.is_finite() && days >= 0.0).then_some(Self(days))
    }

    pub fn days(&self) -> f64 {
        self.0
    }

    /// The window rounded down to whole calendar days.
    fn whole_days(&self) -> u64 {
        self.0.floor() as u64
    }
}

impl FromStr for ThrottleLimit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<f64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| ConfigError::InvalidThrottleLimit(s.to_string()))
    }
}

/// Result of [`clamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleDecision {
    /// Last date (inclusive) to fetch this run.
    pub upper_bound: ObservationDate,
    pub throttled: bool,
}

impl ThrottleDecision {
    /// The Info event operators see on every throttled run.
    pub fn event(&self) -> Option<ErrorEvent> {
        self.throttled.then(|| {
            ErrorEvent::info(format!(
                "Downloading throttled to avoid Weather Underground API throttling. \
                 Only observations up until {} will be downloaded. \
                 Later observations will be downloaded on later runs",
                self.upper_bound
            ))
        })
    }
}

/// Narrows `safety_margin_date` to at most `limit` days past `last_stored_date`.
pub fn clamp(
    safety_margin_date: ObservationDate,
    last_stored_date: ObservationDate,
    limit: ThrottleLimit,
) -> ThrottleDecision {
    let gap_days = (safety_margin_date - last_stored_date).num_days();

    if gap_days as f64 > limit.days() {
        let upper_bound = last_stored_date
            .checked_add_days(Days::new(limit.whole_days()))
            .unwrap_or(safety_margin_date);
        ThrottleDecision {
            upper_bound,
            throttled: true,
        }
    } else {
        ThrottleDecision {
            upper_bound: safety_margin_date,
            throttled: false,
        }
    }
}

/// Source of "today" for the sync engine.
///
/// Injected so that tests can pin the calendar date.

use chrono::{Local, NaiveDate};

pub trait Clock {
    /// The current local calendar date.
    fn today(&self) -> NaiveDate;
}

/// Wall-clock time in the host's local timezone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

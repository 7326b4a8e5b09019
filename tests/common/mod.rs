//! Fake collaborators for driving the sync engine without network or database

#![allow(dead_code)]

use chrono::NaiveDate;
use pws_sync::alert::{ErrorChannel, Notifier, NotifyError};
use pws_sync::ingest::{ApiError, WeatherApi};
use pws_sync::model::{DailyObservationSet, HourlyObservation};
use pws_sync::store::{ObservationStore, StorageError};
use pws_sync::sync::{SyncSettings, ThrottleLimit};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// A day with `hours` hourly summaries, timestamped like the real API.
///
/// Past 24 the local hours repeat, as on a clock-change day.
pub fn day_with(date: NaiveDate, hours: usize) -> DailyObservationSet {
    let observations = (0..hours)
        .map(|h| {
            let mut obs = HourlyObservation::at(date.and_hms_opt((h % 24) as u32, 59, 54).unwrap());
            obs.temperature_mean = Some(5.0 + h as f64 / 10.0);
            obs
        })
        .collect();
    DailyObservationSet::new(date, observations)
}

pub fn settings(initial: NaiveDate, limit_days: f64) -> SyncSettings {
    SyncSettings {
        initial_observation_date: Some(initial),
        throttle_limit: ThrottleLimit::new(limit_days).unwrap(),
        persist_partial_on_abort: false,
    }
}

// ---------------------------------------------------------------------------
// API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Hours(usize),
    /// HTTP 204: nothing at all for the day
    Absent,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Start,
    Stop,
    Fetch(NaiveDate),
}

/// Replies per date; unscripted dates return a complete day.
#[derive(Default)]
pub struct ScriptedApi {
    replies: HashMap<NaiveDate, Reply>,
    /// Fail every `start_session`.
    pub fail_start: bool,
    /// Fail only the n-th `start_session` (1-based; the liveness check is 1).
    pub fail_start_on: Option<usize>,
    /// Fail only the n-th `stop_session` (1-based).
    pub fail_stop_on: Option<usize>,
    pub calls: Vec<Call>,
    in_session: bool,
    starts: usize,
    stops: usize,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, date: NaiveDate, reply: Reply) -> Self {
        self.replies.insert(date, reply);
        self
    }

    pub fn fetched_dates(&self) -> Vec<NaiveDate> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Fetch(date) => Some(*date),
                _ => None,
            })
            .collect()
    }

    pub fn in_session(&self) -> bool {
        self.in_session
    }
}

impl WeatherApi for ScriptedApi {
    fn start_session(&mut self) -> Result<(), ApiError> {
        self.calls.push(Call::Start);
        self.starts += 1;
        if self.fail_start || self.fail_start_on == Some(self.starts) {
            return Err(ApiError::NoSession);
        }
        self.in_session = true;
        Ok(())
    }

    fn stop_session(&mut self) -> Result<(), ApiError> {
        self.calls.push(Call::Stop);
        self.stops += 1;
        self.in_session = false;
        if self.fail_stop_on == Some(self.stops) {
            return Err(ApiError::NoSession);
        }
        Ok(())
    }

    fn fetch_day(&mut self, date: NaiveDate) -> Result<Option<DailyObservationSet>, ApiError> {
        self.calls.push(Call::Fetch(date));
        if !self.in_session {
            return Err(ApiError::NoSession);
        }
        match self.replies.get(&date).copied().unwrap_or(Reply::Hours(24)) {
            Reply::Hours(n) => Ok(Some(day_with(date, n))),
            Reply::Absent => Ok(None),
            Reply::Fail => Err(ApiError::Status {
                date,
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    pub saved: Vec<DailyObservationSet>,
    pub reads: usize,
    pub save_calls: usize,
    pub fail_reads: bool,
    pub fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_days(sets: Vec<DailyObservationSet>) -> Self {
        Self {
            saved: sets,
            ..Self::default()
        }
    }

    pub fn saved_dates(&self) -> Vec<NaiveDate> {
        self.saved.iter().map(|s| s.date).collect()
    }
}

impl ObservationStore for MemoryStore {
    fn most_recent_date(&mut self, default: NaiveDate) -> Result<NaiveDate, StorageError> {
        self.reads += 1;
        if self.fail_reads {
            return Err(StorageError::MissingTable("observations".to_string()));
        }
        Ok(self
            .saved
            .iter()
            .flat_map(|s| s.observations.iter())
            .map(|o| o.observation_time.date())
            .max()
            .unwrap_or(default))
    }

    fn save_all(&mut self, sets: &[DailyObservationSet]) -> Result<usize, StorageError> {
        self.save_calls += 1;
        if self.fail_saves {
            return Err(StorageError::MissingTable("observations".to_string()));
        }
        self.saved.extend(sets.iter().cloned());
        Ok(sets.iter().map(|s| s.len()).sum())
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct RecordingNotifier(Rc<RefCell<Vec<(String, String)>>>);

impl RecordingNotifier {
    pub fn subjects(&self) -> Vec<String> {
        self.0.borrow().iter().map(|(s, _)| s.clone()).collect()
    }

    pub fn bodies(&self) -> Vec<String> {
        self.0.borrow().iter().map(|(_, b)| b.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        self.0.borrow_mut().push((subject.to_string(), body.to_string()));
        Ok(())
    }
}

pub fn channel() -> (ErrorChannel, RecordingNotifier) {
    let notifier = RecordingNotifier::default();
    (ErrorChannel::new(notifier.clone()), notifier)
}

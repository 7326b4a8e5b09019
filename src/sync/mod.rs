/// Observation synchronization engine.
///
/// One run:
/// 1. Liveness check (is the station reporting today?)
/// 2. Read the sync cursor (newest stored date) from storage
/// 3. Clamp the fetch range to the API throttling limit
/// 4. Fetch every missing day, oldest first
/// 5. Save the whole batch in one transaction
/// 6. Flush batched warnings as a single digest
///
/// The engine never trusts data newer than two days old: the provider is
/// slow to finalise yesterday's readings.

pub mod fetch;
pub mod liveness;
pub mod range;
pub mod throttle;

pub use fetch::{FetchOutcome, ObservationFetchLoop};
pub use liveness::{Liveness, LivenessCheck};
pub use throttle::{ThrottleDecision, ThrottleLimit};

use crate::alert::{self, ErrorChannel, ErrorEvent, Terminated};
use crate::clock::Clock;
use crate::ingest::WeatherApi;
use crate::model::{DailyObservationSet, DayCompleteness, ObservationDate};
use crate::store::ObservationStore;
use chrono::Duration;

/// Days between today and the newest date fetched.
pub const SAFETY_MARGIN_DAYS: i64 = 2;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Values the engine needs from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncSettings {
    /// Cursor used when storage is empty. Required.
    pub initial_observation_date: Option<ObservationDate>,
    pub throttle_limit: ThrottleLimit,
    /// Save days collected before a fatal API failure (default: discard).
    pub persist_partial_on_abort: bool,
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub today: ObservationDate,
    pub liveness: Liveness,
    /// Newest stored date at the start of the run.
    pub cursor: ObservationDate,
    pub upper_bound: ObservationDate,
    pub throttled: bool,
    pub days_requested: usize,
    pub days_stored: usize,
    pub rows_inserted: usize,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct SyncOrchestrator<'a> {
    api: &'a mut dyn WeatherApi,
    store: &'a mut dyn ObservationStore,
    clock: &'a dyn Clock,
    errors: &'a mut ErrorChannel,
    settings: SyncSettings,
}

impl<'a> SyncOrchestrator<'a> {
    pub fn new(
        api: &'a mut dyn WeatherApi,
        store: &'a mut dyn ObservationStore,
        clock: &'a dyn Clock,
        errors: &'a mut ErrorChannel,
        settings: SyncSettings,
    ) -> Self {
        Self {
            api,
            store,
            clock,
            errors,
            settings,
        }
    }

    /// Run one synchronization. Batched errors are flushed on every exit path.
    ///
    /// # Errors
    /// [`Terminated`] when a terminating event aborted the run; the event has
    /// already been logged and notified.
    pub fn run(&mut self) -> Result<RunSummary, Terminated> {
        let result = self.sync();
        self.errors.flush();
        result
    }

    fn sync(&mut self) -> Result<RunSummary, Terminated> {
        let today = self.clock.today();

        let liveness = LivenessCheck::new(&mut *self.api, &mut *self.errors).check(today)?;

        let Some(initial_date) = self.settings.initial_observation_date else {
            return Err(self
                .errors
                .abort(ErrorEvent::error("Initial observation date is not configured").notify()));
        };

        let stored = match self.store.most_recent_date(initial_date) {
            Ok(date) => date,
            Err(e) => {
                return Err(self.errors.abort(
                    ErrorEvent::error(format!(
                        "Database access error while getting most recent observation date: {}",
                        alert::describe(&e)
                    ))
                    .notify(),
                ));
            }
        };
        let cursor = stored.max(initial_date);

        let safety_margin_date = today - Duration::days(SAFETY_MARGIN_DAYS);
        let decision = throttle::clamp(safety_margin_date, cursor, self.settings.throttle_limit);
        if let Some(event) = decision.event() {
            self.errors.handle(event)?;
        }

        let dates = range::resolve(cursor, decision.upper_bound);
        let mut summary = RunSummary {
            today,
            liveness,
            cursor,
            upper_bound: decision.upper_bound,
            throttled: decision.throttled,
            days_requested: dates.len(),
            days_stored: 0,
            rows_inserted: 0,
        };

        if dates.is_empty() {
            log::info!("Observations are up to date through {}", cursor);
            return Ok(summary);
        }

        log::info!(
            "Fetching {} day(s) of observations: {} to {}",
            dates.len(),
            dates[0],
            decision.upper_bound
        );

        let outcome = ObservationFetchLoop::new(&mut *self.api, &mut *self.errors).run(&dates);

        if let Some(terminated) = outcome.aborted {
            if self.settings.persist_partial_on_abort && !outcome.sets.is_empty() {
                log::warn!(
                    "Saving {} day(s) fetched before the run was aborted",
                    outcome.sets.len()
                );
                self.persist(&outcome.sets)?;
            }
            return Err(terminated);
        }

        summary.rows_inserted = self.persist(&outcome.sets)?;
        summary.days_stored = outcome.sets.len();
        Ok(summary)
    }

    /// Bulk save, then one Info event per complete day.
    fn persist(&mut self, sets: &[DailyObservationSet]) -> Result<usize, Terminated> {
        if sets.is_empty() {
            return Ok(0);
        }

        let rows = match self.store.save_all(sets) {
            Ok(rows) => rows,
            Err(e) => {
                return Err(self.errors.abort(
                    ErrorEvent::error(format!(
                        "Database access error while saving list of observations: {}",
                        alert::describe(&e)
                    ))
                    .notify(),
                ));
            }
        };

        for set in sets {
            if set.completeness() == DayCompleteness::Complete {
                self.errors
                    .handle(ErrorEvent::info(format!("Observations recorded for {}", set.date)))?;
            }
        }

        Ok(rows)
    }
}

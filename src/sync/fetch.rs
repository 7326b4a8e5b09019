/// Day-by-day retrieval loop.
///
/// Fetches each resolved date in order inside one API session. Empty and
/// partial days become batched warnings and the loop carries on; any API
/// failure records a terminating Critical event and stops the loop.

use crate::alert::{self, ErrorChannel, ErrorEvent, Terminated};
use crate::ingest::WeatherApi;
use crate::model::{DailyObservationSet, DayCompleteness, HOURS_PER_DAY, ObservationDate};

/// What one pass of the loop produced.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Non-empty days, in fetch order.
    pub sets: Vec<DailyObservationSet>,
    /// Set when the loop stopped early on a terminating event.
    pub aborted: Option<Terminated>,
}

pub struct ObservationFetchLoop<'a> {
    api: &'a mut dyn WeatherApi,
    errors: &'a mut ErrorChannel,
}

impl<'a> ObservationFetchLoop<'a> {
    pub fn new(api: &'a mut dyn WeatherApi, errors: &'a mut ErrorChannel) -> Self {
        Self { api, errors }
    }

    /// Fetch `dates` in order. An empty slice opens no session.
    pub fn run(&mut self, dates: &[ObservationDate]) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();
        if dates.is_empty() {
            return outcome;
        }

        if let Err(terminated) = self.fetch_all(dates, &mut outcome) {
            outcome.aborted = Some(terminated);
        }
        outcome
    }

    fn fetch_all(&mut self, dates: &[ObservationDate], outcome: &mut FetchOutcome) -> Result<(), Terminated> {
        if let Err(e) = self.api.start_session() {
            return Err(self.errors.abort(
                ErrorEvent::critical(format!(
                    "Could not start Weather Underground API session: {}",
                    alert::describe(&e)
                ))
                .notify(),
            ));
        }

        for &date in dates {

            let fetched = match self.api.fetch_day(date) {
                Ok(fetched) => fetched,
                Err(e) => {
                    self.close_session_quietly();
                    return Err(self.errors.abort(
                        ErrorEvent::critical(format!(
                            "Weather Underground API failure while fetching {}: {}",
                            date,
                            alert::describe(&e)
                        ))
                        .notify(),
                    ));
                }
            };

            let set = fetched.unwrap_or_else(|| DailyObservationSet::new(date, Vec::new()));
            match set.completeness() {
                DayCompleteness::Empty => {
                    self.errors.handle(
                        ErrorEvent::warning(format!("No data for {} retrieved from Weather Underground", date))
                            .batched()
                            .notify(),
                    )?;
                    continue;
                }
                DayCompleteness::Partial(count) => {
                    self.errors.handle(
                        ErrorEvent::warning(format!(
                            "{} of {} expected observations were retrieved for {} from Weather Underground",
                            count, HOURS_PER_DAY, date
                        ))
                        .batched()
                        .notify(),
                    )?;
                }
                DayCompleteness::Complete => {
                    log::debug!("Retrieved a complete day of observations for {}", date);
                }
            }

            outcome.sets.push(set);
        }

        if let Err(e) = self.api.stop_session() {
            return Err(self.errors.abort(
                ErrorEvent::critical(format!(
                    "Could not stop Weather Underground API session: {}",
                    alert::describe(&e)
                ))
                .notify(),
            ));
        }

        Ok(())
    }

    fn close_session_quietly(&mut self) {
        if let Err(e) = self.api.stop_session() {
            log::warn!("Failed to stop API session after an error: {}", alert::describe(&e));
        }
    }
}

/// Pre-flight check: is the station reporting anything today?
///
/// Runs in its own API session before the main fetch loop. A silent station
/// is worth a Critical notification but does not stop the historical sync;
/// failing to reach the API at all does.

use crate::alert::{self, ErrorChannel, ErrorEvent, Terminated};
use crate::ingest::WeatherApi;
use crate::model::ObservationDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// The station has logged this many hourly summaries today.
    Reporting(usize),
    NotReporting,
}

pub struct LivenessCheck<'a> {
    api: &'a mut dyn WeatherApi,
    errors: &'a mut ErrorChannel,
}

impl<'a> LivenessCheck<'a> {
    pub fn new(api: &'a mut dyn WeatherApi, errors: &'a mut ErrorChannel) -> Self {
        Self { api, errors }
    }

    /// # Errors
    /// [`Terminated`] if the API session or request fails.
    pub fn check(&mut self, today: ObservationDate) -> Result<Liveness, Terminated> {
        if let Err(e) = self.api.start_session() {
            return Err(self.errors.abort(
                ErrorEvent::critical(format!(
                    "Could not start Weather Underground API session for the liveness check: {}",
                    alert::describe(&e)
                ))
                .notify(),
            ));
        }

        let fetched = match self.api.fetch_day(today) {
            Ok(fetched) => fetched,
            Err(e) => {
                if let Err(stop) = self.api.stop_session() {
                    log::warn!("Failed to stop API session after an error: {}", alert::describe(&stop));
                }
                return Err(self.errors.abort(
                    ErrorEvent::critical(format!(
                        "Weather Underground API failure during the liveness check for {}: {}",
                        today,
                        alert::describe(&e)
                    ))
                    .notify(),
                ));
            }
        };

        let liveness = match fetched {
            Some(set) if !set.is_empty() => Liveness::Reporting(set.len()),
            _ => Liveness::NotReporting,
        };

        if let Err(e) = self.api.stop_session() {
            return Err(self.errors.abort(
                ErrorEvent::critical(format!(
                    "Could not stop Weather Underground API session after the liveness check: {}",
                    alert::describe(&e)
                ))
                .notify(),
            ));
        }

        match liveness {
            Liveness::NotReporting => self.errors.handle(
                ErrorEvent::critical(format!(
                    "Weather Underground is not logging observations today ({})",
                    today
                ))
                .notify(),
            )?,
            Liveness::Reporting(count) => {
                log::info!("Station is reporting: {} observations so far today", count)
            }
        }

        Ok(liveness)
    }
}

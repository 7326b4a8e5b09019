/// Remote observation providers.
///
/// The sync engine only talks to [`WeatherApi`]. The Weather Underground
/// client lives in its own file; another provider would get a sibling
/// module rather than growing this one.

pub mod wunderground;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::model::{DailyObservationSet, ObservationDate};

/// Transport, session and decoding failures from a provider.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("no active API session (start_session was not called)")]
    NoSession,

    #[error("failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request for {date} failed")]
    Transport {
        date: ObservationDate,
        #[source]
        source: reqwest::Error,
    },

    #[error("API returned HTTP {status} for {date}")]
    Status {
        date: ObservationDate,
        status: reqwest::StatusCode,
    },

    #[error("could not parse response for {date}: {reason}")]
    Parse { date: ObservationDate, reason: String },
}

/// A provider of hourly observations for one station.
///
/// Calls are made serially; implementations need not be thread-safe.
pub trait WeatherApi {
    /// Acquire a session (HTTP client, auth token, ...).
    fn start_session(&mut self) -> Result<(), ApiError>;

    /// Release the session. Safe to call when no session is active.
    fn stop_session(&mut self) -> Result<(), ApiError>;

    /// Fetch the hourly observations for `date`.
    ///
    /// Returns `Ok(None)` when the provider has nothing at all for the day,
    /// and `Ok(Some(set))` otherwise (the set may still be empty or partial).
    fn fetch_day(&mut self, date: ObservationDate) -> Result<Option<DailyObservationSet>, ApiError>;
}

/// Shared data types for the observation sync engine.
///
/// These are the strongly-typed forms of what the Weather Underground API
/// returns. The API client converts its wire structs into these at the
/// boundary, so nothing downstream does keyed lookups into raw JSON.

use chrono::{NaiveDate, NaiveDateTime};

/// A calendar day identifying one day's worth of hourly readings.
pub type ObservationDate = NaiveDate;

/// Number of hourly readings in a complete day.
pub const HOURS_PER_DAY: usize = 24;

// ---------------------------------------------------------------------------
// Observations
// ---------------------------------------------------------------------------

/// One hourly summary reading from a personal weather station.
///
/// All metric units are metric (`units=m`). Any metric the station did not
/// report is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlyObservation {
    /// Local station time at the end of the hour.
    pub observation_time: NaiveDateTime,

    pub solar_radiation_high: Option<f64>,
    pub uv_high: Option<f64>,
    pub wind_direction_mean: Option<f64>,

    pub humidity_high: Option<f64>,
    pub humidity_low: Option<f64>,
    pub humidity_mean: Option<f64>,

    pub temperature_high: Option<f64>,
    pub temperature_low: Option<f64>,
    pub temperature_mean: Option<f64>,

    pub wind_speed_high: Option<f64>,
    pub wind_speed_low: Option<f64>,
    pub wind_speed_mean: Option<f64>,

    pub wind_gust_high: Option<f64>,
    pub wind_gust_low: Option<f64>,
    pub wind_gust_mean: Option<f64>,

    pub dew_point_high: Option<f64>,
    pub dew_point_low: Option<f64>,
    pub dew_point_mean: Option<f64>,

    pub wind_chill_high: Option<f64>,
    pub wind_chill_low: Option<f64>,
    pub wind_chill_mean: Option<f64>,

    pub heat_index_high: Option<f64>,
    pub heat_index_low: Option<f64>,
    pub heat_index_mean: Option<f64>,

    pub pressure_high: Option<f64>,
    pub pressure_low: Option<f64>,
    pub pressure_trend: Option<f64>,

    pub precipitation_rate: Option<f64>,
    pub precipitation_total: Option<f64>,
}

impl HourlyObservation {
    /// An observation at `observation_time` with every metric unset.
    pub fn at(observation_time: NaiveDateTime) -> Self {
        Self {
            observation_time,
            ..Self::default()
        }
    }
}

/// How much of a day the provider returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayCompleteness {
    /// No readings at all. Not stored.
    Empty,
    /// Between 1 and 23 readings (or, defensively, more than 24).
    Partial(usize),
    /// Exactly [`HOURS_PER_DAY`] readings.
    Complete,
}

/// Everything fetched for a single [`ObservationDate`].
#[derive(Debug, Clone, PartialEq)]
pub struct DailyObservationSet {
    pub date: ObservationDate,
    /// Hourly readings in the order the provider returned them.
    pub observations: Vec<HourlyObservation>,
}

impl DailyObservationSet {
    pub fn new(date: ObservationDate, observations: Vec<HourlyObservation>) -> Self {
        Self { date, observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn completeness(&self) -> DayCompleteness {
        match self.observations.len() {
            0 => DayCompleteness::Empty,
            HOURS_PER_DAY => DayCompleteness::Complete,
            n => DayCompleteness::Partial(n),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

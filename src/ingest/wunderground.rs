/// Weather Underground PWS history API client.
///
/// Fetches one day of hourly summaries per request from:
///   https://api.weather.com/v2/pws/history/hourly
///
/// The response is `{"observations": [...]}` with imperial/metric values
/// nested under a `metric` object when `units=m`. See `fixtures.rs` for
/// representative payloads.

use super::{ApiError, WeatherApi};
use crate::model::{DailyObservationSet, HourlyObservation, ObservationDate};
use chrono::NaiveDateTime;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const HISTORY_BASE_URL: &str = "https://api.weather.com/v2/pws/history/hourly";
const OBS_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const REQUEST_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Serde structures for the history response
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    observations: Option<Vec<WuObservation>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WuObservation {
    obs_time_local: String,
    solar_radiation_high: Option<f64>,
    uv_high: Option<f64>,
    winddir_avg: Option<f64>,
    humidity_high: Option<f64>,
    humidity_low: Option<f64>,
    humidity_avg: Option<f64>,
    #[serde(default)]
    metric: Option<WuMetric>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WuMetric {
    temp_high: Option<f64>,
    temp_low: Option<f64>,
    temp_avg: Option<f64>,
    windspeed_high: Option<f64>,
    windspeed_low: Option<f64>,
    windspeed_avg: Option<f64>,
    windgust_high: Option<f64>,
    windgust_low: Option<f64>,
    windgust_avg: Option<f64>,
    dewpt_high: Option<f64>,
    dewpt_low: Option<f64>,
    dewpt_avg: Option<f64>,
    windchill_high: Option<f64>,
    windchill_low: Option<f64>,
    windchill_avg: Option<f64>,
    heatindex_high: Option<f64>,
    heatindex_low: Option<f64>,
    heatindex_avg: Option<f64>,
    pressure_max: Option<f64>,
    pressure_min: Option<f64>,
    pressure_trend: Option<f64>,
    precip_rate: Option<f64>,
    precip_total: Option<f64>,
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Builds the hourly history URL for one station and one day.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use pws_sync::ingest::wunderground::build_history_url;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
/// let url = build_history_url("IEXAMPLE1", "secret", date);
/// assert!(url.contains("date=20240102"));
/// ```
pub fn build_history_url(station_id: &str, api_key: &str, date: ObservationDate) -> String {
    history_url(HISTORY_BASE_URL, station_id, api_key, date)
}

fn history_url(base_url: &str, station_id: &str, api_key: &str, date: ObservationDate) -> String {
    format!(
        "{}?stationId={}&format=json&units=m&date={}&apiKey={}",
        base_url,
        station_id,
        date.format("%Y%m%d"),
        api_key
    )
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parses a history response body into a typed day of observations.
///
/// A missing or `null` `observations` array yields an empty set.
///
/// # Errors
/// `ApiError::Parse` for malformed JSON or an unparseable `obsTimeLocal`.
pub fn parse_history_response(json: &str, date: ObservationDate) -> Result<DailyObservationSet, ApiError> {
    let response: HistoryResponse = serde_json::from_str(json).map_err(|e| ApiError::Parse {
        date,
        reason: format!("JSON deserialization failed: {}", e),
    })?;

    let observations = response
        .observations
        .unwrap_or_default()
        .into_iter()
        .map(|obs| convert_observation(obs, date))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DailyObservationSet::new(date, observations))
}

fn convert_observation(obs: WuObservation, date: ObservationDate) -> Result<HourlyObservation, ApiError> {
    let observation_time = NaiveDateTime::parse_from_str(&obs.obs_time_local, OBS_TIME_FORMAT)
        .map_err(|e| ApiError::Parse {
            date,
            reason: format!("bad obsTimeLocal '{}': {}", obs.obs_time_local, e),
        })?;

    let m = obs.metric.unwrap_or_default();

    Ok(HourlyObservation {
        observation_time,
        solar_radiation_high: obs.solar_radiation_high,
        uv_high: obs.uv_high,
        wind_direction_mean: obs.winddir_avg,
        humidity_high: obs.humidity_high,
        humidity_low: obs.humidity_low,
        humidity_mean: obs.humidity_avg,
        temperature_high: m.temp_high,
        temperature_low: m.temp_low,
        temperature_mean: m.temp_avg,
        wind_speed_high: m.windspeed_high,
        wind_speed_low: m.windspeed_low,
        wind_speed_mean: m.windspeed_avg,
        wind_gust_high: m.windgust_high,
        wind_gust_low: m.windgust_low,
        wind_gust_mean: m.windgust_avg,
        dew_point_high: m.dewpt_high,
        dew_point_low: m.dewpt_low,
        dew_point_mean: m.dewpt_avg,
        wind_chill_high: m.windchill_high,
        wind_chill_low: m.windchill_low,
        wind_chill_mean: m.windchill_avg,
        heat_index_high: m.heatindex_high,
        heat_index_low: m.heatindex_low,
        heat_index_mean: m.heatindex_avg,
        pressure_high: m.pressure_max,
        pressure_low: m.pressure_min,
        pressure_trend: m.pressure_trend,
        precipitation_rate: m.precip_rate,
        precipitation_total: m.precip_total,
    })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Blocking client for one Weather Underground station.
///
/// A session is just a live `reqwest` client; stopping the session drops it
/// along with its connection pool.
///
/// The API key travels in the query string, so request URLs are stripped
/// from every error before it can reach a log line or a notification.
pub struct WundergroundClient {
    station_id: String,
    api_key: String,
    base_url: String,
    http: Option<reqwest::blocking::Client>,
}

impl WundergroundClient {
    pub fn new(station_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            api_key: api_key.into(),
            base_url: HISTORY_BASE_URL.to_string(),
            http: None,
        }
    }

    /// Point the client at another history endpoint (a mirror or a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn has_session(&self) -> bool {
        self.http.is_some()
    }
}

impl WeatherApi for WundergroundClient {
    fn start_session(&mut self) -> Result<(), ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::ClientBuild)?;

        log::debug!("Started Weather Underground session for {}", self.station_id);
        self.http = Some(client);
        Ok(())
    }

    fn stop_session(&mut self) -> Result<(), ApiError> {
        if self.http.take().is_some() {
            log::debug!("Stopped Weather Underground session for {}", self.station_id);
        }
        Ok(())
    }

    fn fetch_day(&mut self, date: ObservationDate) -> Result<Option<DailyObservationSet>, ApiError> {
        let client = self.http.as_ref().ok_or(ApiError::NoSession)?;
        let url = history_url(&self.base_url, &self.station_id, &self.api_key, date);

        log::debug!("Fetching observations for {} on {}", self.station_id, date);

        let response = client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .map_err(|source| transport_error(date, source))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ApiError::Status { date, status });
        }

        let body = response
            .text()
            .map_err(|source| transport_error(date, source))?;

        if body.trim().is_empty() {
            return Ok(None);
        }

        parse_history_response(&body, date).map(Some)
    }
}

fn transport_error(date: ObservationDate, source: reqwest::Error) -> ApiError {
    ApiError::Transport {
        date,
        source: source.without_url(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;
    use crate::alert::describe;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    #[test]
    fn test_build_history_url() {
        let url = build_history_url("IEXAMPLE1", "abc123", date());
        assert_eq!(
            url,
            "https://api.weather.com/v2/pws/history/hourly?stationId=IEXAMPLE1&format=json&units=m&date=20240102&apiKey=abc123"
        );
    }

    #[test]
    fn test_parse_two_hours() {
        let set = parse_history_response(fixture_two_hours_json(), date()).unwrap();

        assert_eq!(set.date, date());
        assert_eq!(set.len(), 2);

        let first = &set.observations[0];
        assert_eq!(
            first.observation_time,
            date().and_hms_opt(0, 59, 54).unwrap()
        );
        assert_eq!(first.temperature_high, Some(4.2));
        assert_eq!(first.temperature_mean, Some(3.9));
        assert_eq!(first.pressure_high, Some(1012.53));
        assert_eq!(first.pressure_low, Some(1011.85));
        assert_eq!(first.wind_direction_mean, Some(225.0));
        assert_eq!(first.humidity_mean, Some(91.4));
        assert_eq!(first.precipitation_total, Some(0.25));
    }

    #[test]
    fn test_nulls_become_none() {
        let set = parse_history_response(fixture_two_hours_json(), date()).unwrap();
        let second = &set.observations[1];

        assert_eq!(second.solar_radiation_high, None);
        assert_eq!(second.uv_high, None);
        assert_eq!(second.wind_chill_low, None);
        assert_eq!(second.temperature_low, Some(3.1));
    }

    #[test]
    fn test_missing_metric_block() {
        let set = parse_history_response(fixture_no_metric_json(), date()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.observations[0].humidity_high, Some(97.0));
        assert_eq!(set.observations[0].temperature_high, None);
    }

    #[test]
    fn test_empty_observations_is_empty_set() {
        let set = parse_history_response(fixture_empty_json(), date()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_null_observations_is_empty_set() {
        let set = parse_history_response(r#"{"observations": null}"#, date()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_bad_timestamp_is_parse_error() {
        let result = parse_history_response(fixture_bad_timestamp_json(), date());
        match result {
            Err(ApiError::Parse { date: d, reason }) => {
                assert_eq!(d, date());
                assert!(reason.contains("obsTimeLocal"), "reason was: {}", reason);
            }
            other => panic!("Expected parse error, got {:?}", other.map(|s| s.len())),
        }
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            parse_history_response("{ not json", date()),
            Err(ApiError::Parse { .. })
        ));
    }

    #[test]
    fn test_fetch_without_session_fails() {
        let mut client = WundergroundClient::new("IEXAMPLE1", "key");
        assert!(!client.has_session());
        assert!(matches!(client.fetch_day(date()), Err(ApiError::NoSession)));
    }

    #[test]
    fn test_session_lifecycle() {
        let mut client = WundergroundClient::new("IEXAMPLE1", "key");
        client.start_session().unwrap();
        assert!(client.has_session());
        client.stop_session().unwrap();
        assert!(!client.has_session());
        // Stopping twice is harmless
        client.stop_session().unwrap();
    }

    #[test]
    fn test_transport_error_hides_api_key() {
        // Nothing listens on the discard port, so the connection is refused
        let mut client = WundergroundClient::new("IEXAMPLE1", "SUPERSECRETKEY")
            .with_base_url("http://127.0.0.1:9/v2/pws/history/hourly");
        client.start_session().unwrap();

        let err = client.fetch_day(date()).unwrap_err();
        let text = describe(&err);

        assert!(matches!(err, ApiError::Transport { .. }), "got: {}", text);
        assert!(!text.contains("SUPERSECRETKEY"), "API key leaked: {}", text);
        assert!(text.contains("2024-01-02"));
    }
}

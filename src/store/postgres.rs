/// PostgreSQL-backed observation store.
///
/// Connects with clear error messages, verifies the `observations` table is
/// present, and writes each run's batch inside a single transaction.

use super::{ObservationStore, StorageError};
use crate::model::{DailyObservationSet, HourlyObservation, ObservationDate};
use chrono::NaiveDateTime;
use postgres::types::ToSql;
use postgres::{Client, NoTls};
use rust_decimal::Decimal;
use std::env;

pub const OBSERVATIONS_TABLE: &str = "observations";

/// Metric columns in insert order; must match [`metric_values`].
const METRIC_COLUMNS: [&str; 29] = [
    "solar_radiation_high",
    "uv_high",
    "wind_direction_mean",
    "humidity_high",
    "humidity_low",
    "humidity_mean",
    "temperature_high",
    "temperature_low",
    "temperature_mean",
    "wind_speed_high",
    "wind_speed_low",
    "wind_speed_mean",
    "wind_gust_high",
    "wind_gust_low",
    "wind_gust_mean",
    "dew_point_high",
    "dew_point_low",
    "dew_point_mean",
    "wind_chill_high",
    "wind_chill_low",
    "wind_chill_mean",
    "heat_index_high",
    "heat_index_low",
    "heat_index_mean",
    "pressure_high",
    "pressure_low",
    "pressure_trend",
    "precipitation_rate",
    "precipitation_total",
];

fn metric_values(obs: &HourlyObservation) -> [Option<f64>; 29] {
    [
        obs.solar_radiation_high,
        obs.uv_high,
        obs.wind_direction_mean,
        obs.humidity_high,
        obs.humidity_low,
        obs.humidity_mean,
        obs.temperature_high,
        obs.temperature_low,
        obs.temperature_mean,
        obs.wind_speed_high,
        obs.wind_speed_low,
        obs.wind_speed_mean,
        obs.wind_gust_high,
        obs.wind_gust_low,
        obs.wind_gust_mean,
        obs.dew_point_high,
        obs.dew_point_low,
        obs.dew_point_mean,
        obs.wind_chill_high,
        obs.wind_chill_low,
        obs.wind_chill_mean,
        obs.heat_index_high,
        obs.heat_index_low,
        obs.heat_index_mean,
        obs.pressure_high,
        obs.pressure_low,
        obs.pressure_trend,
        obs.precipitation_rate,
        obs.precipitation_total,
    ]
}

/// `INSERT` statement with one placeholder per column.
fn insert_statement() -> String {
    let columns = METRIC_COLUMNS.join(", ");
    let placeholders = (1..=METRIC_COLUMNS.len() + 1)
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} (observation_time, {}) VALUES ({})",
        OBSERVATIONS_TABLE, columns, placeholders
    )
}

fn url_looks_valid(url: &str) -> bool {
    url.starts_with("postgresql://") || url.starts_with("postgres://")
}

/// Replaces the `user:password@` part of a connection URL with `***@`.
pub fn redact_credentials(url: &str) -> String {
    let (scheme, rest) = match url.find("://") {
        Some(i) => url.split_at(i + 3),
        None => ("", url),
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());

    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{}***{}", scheme, &rest[at..]),
        None => url.to_string(),
    }
}

/// Picks the configured URL, falling back to `DATABASE_URL` (`.env` honoured).
pub fn resolve_database_url(configured: Option<&str>) -> Result<String, StorageError> {
    if let Some(url) = configured {
        return Ok(url.to_string());
    }

    dotenv::dotenv().ok();
    env::var("DATABASE_URL").map_err(|_| StorageError::MissingDatabaseUrl)
}

pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    /// Connect and verify the `observations` table exists.
    pub fn connect(url: &str) -> Result<Self, StorageError> {
        if !url_looks_valid(url) {
            return Err(StorageError::InvalidDatabaseUrl(redact_credentials(url)));
        }

        let client = Client::connect(url, NoTls).map_err(StorageError::ConnectionFailed)?;
        let mut store = Self { client };
        store.verify_table(OBSERVATIONS_TABLE)?;
        Ok(store)
    }

    fn verify_table(&mut self, table: &str) -> Result<(), StorageError> {
        let row = self
            .client
            .query_one(
                "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
                &[&table],
            )
            .map_err(|source| StorageError::Query {
                operation: "checking the database schema",
                source,
            })?;

        let exists: bool = row.get(0);
        if !exists {
            return Err(StorageError::MissingTable(table.to_string()));
        }
        Ok(())
    }
}

impl ObservationStore for PostgresStore {
    fn most_recent_date(&mut self, default: ObservationDate) -> Result<ObservationDate, StorageError> {
        let row = self
            .client
            .query_one(
                &format!("SELECT MAX(observation_time) FROM {}", OBSERVATIONS_TABLE),
                &[],
            )
            .map_err(|source| StorageError::Query {
                operation: "getting the most recent observation date",
                source,
            })?;

        let latest: Option<NaiveDateTime> = row.get(0);
        Ok(latest.map(|dt| dt.date()).unwrap_or(default))
    }

    fn save_all(&mut self, sets: &[DailyObservationSet]) -> Result<usize, StorageError> {
        let save_err = |source| StorageError::Query {
            operation: "saving the list of observations",
            source,
        };

        let mut transaction = self.client.transaction().map_err(save_err)?;
        let stmt = transaction.prepare(&insert_statement()).map_err(save_err)?;

        let mut inserted = 0;
        for set in sets {
            for obs in &set.observations {
                let metrics: Vec<Option<Decimal>> = metric_values(obs)
                    .iter()
                    .map(|v| v.and_then(|x| Decimal::try_from(x).ok()))
                    .collect();

                let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(metrics.len() + 1);
                params.push(&obs.observation_time);
                for metric in &metrics {
                    params.push(metric);
                }

                inserted += transaction.execute(&stmt, &params).map_err(save_err)? as usize;
            }
        }

        // Dropping an uncommitted transaction rolls it back
        transaction.commit().map_err(save_err)?;
        Ok(inserted)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

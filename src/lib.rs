/// pws_sync: incremental download of personal weather station observations
/// from Weather Underground into PostgreSQL.
///
/// # Module structure
///
/// ```text
/// pws_sync
/// ├── model       — shared data types (HourlyObservation, DailyObservationSet, …)
/// ├── config      — TOML configuration loader
/// ├── clock       — injectable "today"
/// ├── alert       — ErrorEvent severities and the batching error channel
/// │   ├── channel — logging, notification, digests, abort decisions
/// │   ├── email   — SMTP notifier
/// │   └── notify  — Notifier trait + log-backed sink
/// ├── ingest
/// │   ├── wunderground — PWS history API: URL construction, JSON parsing, client
/// │   └── fixtures (test only) — representative API response payloads
/// ├── store
/// │   └── postgres — cursor query + transactional bulk insert
/// └── sync        — the orchestrator
///     ├── throttle — API throttling limit
///     ├── range    — dates still to fetch
///     ├── liveness — is the station reporting today?
///     └── fetch    — day-by-day retrieval loop
/// ```

/// Public modules
pub mod alert;
pub mod clock;
pub mod config;
pub mod ingest;
pub mod model;
pub mod store;
pub mod sync;

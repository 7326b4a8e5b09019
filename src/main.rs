//! Weather station observation downloader
//!
//! Run once per day (cron, systemd timer):
//! 1. Checks the station is reporting today
//! 2. Downloads every day not yet stored, up to two days ago
//! 3. Saves them to PostgreSQL in one transaction
//! 4. Sends a single digest for any partial or empty days
//!
//! Usage:
//!   pws_sync /etc/pws_sync/pws_sync.toml
//!
//! Environment:
//!   DATABASE_URL - PostgreSQL connection string (unless [database] url is set)
//!   RUST_LOG     - log filter (default: info)
//!
//! Notifications are emailed when the config has an [email] section and are
//! written to the log otherwise.

use argh::FromArgs;
use pws_sync::alert::{self, ErrorChannel, ErrorEvent, LogNotifier, Notifier, SmtpNotifier};
use pws_sync::clock::SystemClock;
use pws_sync::config::{Config, EmailConfig};
use pws_sync::ingest::wunderground::WundergroundClient;
use pws_sync::store::postgres::{PostgresStore, resolve_database_url};
use pws_sync::sync::SyncOrchestrator;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process;

#[derive(FromArgs)]
/// Download recent observations from Weather Underground.
struct Args {
    /// fully qualified name of the config file
    #[argh(positional)]
    config_file: PathBuf,
}

fn main() {
    let args: Args = argh::from_env();

    if !args.config_file.is_file() {
        eprintln!(
            "The supplied configuration file {} does not exist",
            args.config_file.display()
        );
        process::exit(1);
    }

    let config = match Config::load(&args.config_file) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", alert::describe(&e));
            process::exit(1);
        }
    };

    init_logging(config.downloader.log_file.as_deref());
    install_panic_hook();

    let settings = match config.sync_settings() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Configuration error: {}", alert::describe(&e));
            process::exit(1);
        }
    };

    let station_id = config.weather_underground.station_id.clone();
    let mut errors =
        ErrorChannel::boxed(notifier(config.email.as_ref())).with_subject(format!("Weather station {}", station_id));

    let connected = resolve_database_url(config.database.url.as_deref()).and_then(|url| PostgresStore::connect(&url));
    let mut store = match connected {
        Ok(store) => store,
        Err(e) => {
            errors.abort(ErrorEvent::error(format!("Database access error: {}", alert::describe(&e))).notify());
            errors.flush();
            process::exit(1);
        }
    };

    let mut api = WundergroundClient::new(station_id, config.weather_underground.api_key.clone());
    let clock = SystemClock;

    let mut orchestrator = SyncOrchestrator::new(&mut api, &mut store, &clock, &mut errors, settings);
    match orchestrator.run() {
        Ok(summary) => {
            log::info!(
                "Run complete: {} day(s) requested ({} to {}{}), {} stored, {} rows inserted",
                summary.days_requested,
                summary.cursor,
                summary.upper_bound,
                if summary.throttled { ", throttled" } else { "" },
                summary.days_stored,
                summary.rows_inserted
            );
        }
        Err(terminated) => {
            log::error!("Run aborted: {}", terminated);
            process::exit(1);
        }
    }
}

/// Email when `[email]` is configured and usable, otherwise the log.
fn notifier(email: Option<&EmailConfig>) -> Box<dyn Notifier> {
    let Some(email) = email else {
        log::info!("No [email] section configured: notifications go to the log");
        return Box::new(LogNotifier);
    };

    match SmtpNotifier::from_config(email) {
        Ok(smtp) => {
            log::info!("Notifications will be emailed to {} via {}", smtp.recipient(), email.host);
            Box::new(smtp)
        }
        Err(e) => {
            log::warn!("Email notifications disabled, falling back to the log: {}", e);
            Box::new(LogNotifier)
        }
    }
}

/// Logs to `log_file` (appending) when given, otherwise stderr.
fn init_logging(log_file: Option<&Path>) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    let mut unusable_file = None;
    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => unusable_file = Some((path.to_path_buf(), e)),
        }
    }

    builder.init();

    if let Some((path, e)) = unusable_file {
        log::warn!("Couldn't open the supplied log file {}: {}", path.display(), e);
    }
}

/// Unhandled faults are Critical: make sure they reach the log sink.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        log::error!("Critical: Unhandled fault: {}", info);
        default_hook(info);
    }));
}

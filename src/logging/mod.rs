//! Logging setup.
//!
//! Console logging via `tracing_subscriber` with an `EnvFilter`, plus an
//! optional daily-rolling file layer. Old log files are cleaned up on
//! startup instead of by a background task; the process is short-lived.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "wifi_sentry=info,sqlx=warn";

/// Verbose log filter directive.
const VERBOSE_LOG_FILTER: &str = "wifi_sentry=debug,sqlx=warn";

/// Log file retention period in days.
const LOG_RETENTION_DAYS: u64 = 7;

/// Initialize logging. Returns the appender guard that must stay alive for
/// the duration of the process when file logging is enabled.
pub fn init(log_dir: Option<&Path>, verbose: bool) -> Option<WorkerGuard> {
    let default_filter = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    match log_dir {
        Some(dir) => {
            cleanup_old_logs(dir, LOG_RETENTION_DAYS);
            let appender = tracing_appender::rolling::daily(dir, "wifi-sentry.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false))
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false))
                .init();
            None
        }
    }
}

/// Delete log files older than `retention_days`. Best-effort.
fn cleanup_old_logs(dir: &Path, retention_days: u64) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let cutoff = Duration::from_secs(retention_days * 24 * 60 * 60);

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let too_old = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .is_some_and(|age| age > cutoff);
        if too_old {
            let _ = fs::remove_file(&path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_ignores_missing_directory() {
        cleanup_old_logs(Path::new("/nonexistent/logs"), LOG_RETENTION_DAYS);
    }

    #[test]
    fn cleanup_keeps_fresh_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("wifi-sentry.log.2026-08-27");
        fs::write(&file, "recent").unwrap();

        cleanup_old_logs(dir.path(), LOG_RETENTION_DAYS);
        assert!(file.exists());
    }
}

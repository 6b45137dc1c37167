//! Logging setup.
//!
//! Console output always; a daily rotated file in `log_dir` when one is
//! configured. Timestamps use the local timezone. `RUST_LOG` overrides the
//! default filter.

use chrono::{Local, Utc};
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::Writer, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "live_notifier=info,youtube_api=info,reqwest=warn";

/// Log file prefix; the appender adds `.YYYY-MM-DD`.
pub const LOG_FILE_PREFIX: &str = "live-notifier.log";

/// Log retention period in days.
const LOG_RETENTION_DAYS: i64 = 7;

/// Custom timer that uses the local timezone via chrono.
#[derive(Debug, Clone, Copy)]
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

/// Initialize the global subscriber.
///
/// Returns the file writer guard when file logging is enabled; keep it alive
/// for the lifetime of the process or buffered lines are lost.
pub fn init_logging(log_dir: Option<&Path>) -> crate::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let console = fmt::layer().with_ansi(true).with_timer(LocalTimer);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_timer(LocalTimer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| {
            crate::Error::Other(format!("Failed to set global default subscriber: {}", e))
        })?;

    if let Some(dir) = log_dir {
        info!(dir = %dir.display(), "Writing log files");
        match cleanup_old_logs(dir, LOG_RETENTION_DAYS) {
            Ok(0) => {}
            Ok(count) => info!(count, "Cleaned up old log files"),
            Err(e) => warn!(error = %e, "Failed to cleanup old logs"),
        }
    }

    Ok(guard)
}

/// Delete rotated log files older than `retention_days`. Returns how many were removed.
pub fn cleanup_old_logs(log_dir: &Path, retention_days: i64) -> std::io::Result<usize> {
    let cutoff = (Utc::now() - chrono::Duration::days(retention_days)).date_naive();
    let prefix = format!("{LOG_FILE_PREFIX}.");
    let mut deleted_count = 0;

    for entry in std::fs::read_dir(log_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        let Some(date_str) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix(prefix.as_str()))
        else {
            continue;
        };

        let Ok(file_date) = chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d") else {
            continue;
        };

        if file_date < cutoff {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    deleted_count += 1;
                    debug!(path = %path.display(), "Deleted old log file");
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to delete old log file"),
            }
        }
    }

    Ok(deleted_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert!(DEFAULT_LOG_FILTER.contains("live_notifier=info"));
        assert!(DEFAULT_LOG_FILTER.contains("reqwest=warn"));
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn test_cleanup_old_logs() {
        let dir = tempfile::tempdir().unwrap();
        let old = Utc::now().date_naive() - chrono::Duration::days(30);
        let today = Utc::now().date_naive();

        let old_file = dir
            .path()
            .join(format!("{LOG_FILE_PREFIX}.{}", old.format("%Y-%m-%d")));
        let new_file = dir
            .path()
            .join(format!("{LOG_FILE_PREFIX}.{}", today.format("%Y-%m-%d")));
        let unrelated = dir.path().join("notes.txt");
        for path in [&old_file, &new_file, &unrelated] {
            std::fs::write(path, "x").unwrap();
        }

        let deleted = cleanup_old_logs(dir.path(), LOG_RETENTION_DAYS).unwrap();
        assert_eq!(deleted, 1);
        assert!(!old_file.exists());
        assert!(new_file.exists());
        assert!(unrelated.exists());
    }
}

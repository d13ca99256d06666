use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "OURLIBRARY_LOG";
pub const DEFAULT_FILTER: &str = "ourlibrary=info,sqlx=warn";
const LOG_FILE_PREFIX: &str = "ourlibrary.log";

/// Install the global subscriber: JSON lines on stderr, plus a daily rolling
/// file under `log_dir` when one is given.
///
/// Keep the returned guard alive for as long as file logs should be flushed.
pub fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let _ = tracing_log::LogTracer::init();

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let stderr_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => match std::fs::create_dir_all(dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(writer);
                (Some(layer), Some(guard))
            }
            Err(err) => {
                eprintln!("ourlibrary: file logging disabled: {err}");
                (None, None)
            }
        },
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    guard
}

/// Platform data directory for the desktop app's log files.
pub fn default_log_dir() -> Option<std::path::PathBuf> {
    dirs::data_local_dir().map(|base| base.join("org.ourlibrary.desktop").join("logs"))
}

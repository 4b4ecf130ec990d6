//! Logging initialization
//!
//! Console logging through a `tracing` fmt layer, optionally paired with a
//! daily-rolling file under `LATCHD_LOG_DIR`. The filter comes from the
//! `LATCHD_LOG` environment variable, falling back to the configured
//! default directive.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Environment variable holding the filter directives (RUST_LOG syntax)
const FILTER_ENV: &str = "LATCHD_LOG";

/// Log file name under the configured log directory
const LOG_FILE: &str = "latchd.log";

/// Initialize the global tracing subscriber.
///
/// Returns the non-blocking writer guard when file logging is enabled; the
/// caller keeps it alive for the process lifetime so buffered log lines are
/// flushed on shutdown.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    // Route `log` records (actix middleware) into tracing
    let _ = tracing_log::LogTracer::init();

    let filter = EnvFilter::try_from_env(FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config.filter.clone()));
    let console_layer = fmt::layer().with_target(true);

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer().with_ansi(false).with_writer(writer);
            let _ = Registry::default()
                .with(filter)
                .with(console_layer)
                .with(file_layer)
                .try_init();
            Some(guard)
        }
        None => {
            let _ = Registry::default()
                .with(filter)
                .with(console_layer)
                .try_init();
            None
        }
    }
}

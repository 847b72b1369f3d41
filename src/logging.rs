//! Logging configuration with file-based output and size-based rotation.
//!
//! Writes logs to `~/.config/talking-timer/talking-timer.log` (or platform
//! equivalent) with 10 MB size-based rotation. Set `DEBUG_LOGGING=1` to
//! enable debug output for the timer crates.

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use talking_timer_core::context::APP_NAME;

const LOG_FILE: &str = "talking-timer.log";
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Initialize logging to the log file, and to stderr when `DEBUG_LOGGING` is set.
///
/// Returns a `WorkerGuard` that must be held for the application lifetime
/// so buffered lines are flushed on shutdown. Returns `None` when the log
/// file can't be created; logging then goes to stderr only.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let log_dir = match dirs::config_dir() {
        Some(config) => config.join(APP_NAME),
        None => {
            init_stderr_only(debug_logging);
            return None;
        }
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // Subscriber isn't installed yet
        eprintln!(
            "Failed to create log directory {:?}: {}, using stderr only",
            log_dir, e
        );
        init_stderr_only(debug_logging);
        return None;
    }

    let log_path = log_dir.join(LOG_FILE);
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(MAX_LOG_BYTES),
        1,
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {:?}: {}", log_path, e);
            init_stderr_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    // The REPL owns stdout, so console logging only appears when debugging
    let stderr_layer = debug_logging.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::NONE)
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(EnvFilter::new(filter_directive(debug_logging)))
        .init();

    tracing::info!(log_file = ?log_path, debug_logging, "talking timer logging initialized");

    Some(guard)
}

fn init_stderr_only(debug_logging: bool) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(EnvFilter::new(filter_directive(debug_logging)))
        .init();

    tracing::info!(debug_logging, "talking timer logging initialized (stderr only)");
}

fn filter_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        "info,talking_timer=debug,talking_timer_core=debug"
    } else {
        "info"
    }
}

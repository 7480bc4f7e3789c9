//! Log subscriber initialization.
//!
//! Installs a console subscriber, and a daily-rolling file subscriber when
//! the configured output names a directory. `RUST_LOG` overrides the
//! configured level when set.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSection;
use crate::error::{Error, Result};

static INITIALIZED: AtomicBool = AtomicBool::new(false);
// The guard must stay alive for the file writer to keep flushing.
static WORKER_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

/// Initializes logging once for the process; later calls are no-ops.
pub fn init(config: &LoggingSection) -> Result<()> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|err| Error::Logging(err.to_string()))?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_target(false)
        .with_ansi(false);

    match config.output.as_str() {
        "stdout" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init()
                .map_err(|err| Error::Logging(err.to_string()))?;
        }
        log_dir => {
            let file_appender = tracing_appender::rolling::daily(log_dir, "vespucci.log");
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_writer)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .with(file_layer)
                .try_init()
                .map_err(|err| Error::Logging(err.to_string()))?;

            WORKER_GUARD.lock().replace(guard);
        }
    }

    Ok(())
}

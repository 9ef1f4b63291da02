//! Process-wide diagnostic logging
//!
//! Events go to stderr and, when enabled, to `<log_dir>/experiment.log`
//! through a non-blocking writer. The returned guard flushes the file on drop
//! and must live until the process exits.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Log file name inside the configured directory
pub const LOG_FILE_NAME: &str = "experiment.log";

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured level; `verbose` raises the configured
/// level to `debug`. The file sink is attached only when `with_file` is set
/// and the configuration enables it.
pub fn init_logging(config: &LoggingConfig, verbose: bool, with_file: bool) -> Result<Option<WorkerGuard>> {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = if with_file && config.file {
        std::fs::create_dir_all(&config.log_dir).with_context(|| {
            format!("Failed to create log directory: {}", config.log_dir.display())
        })?;
        let appender = tracing_appender::rolling::never(&config.log_dir, LOG_FILE_NAME);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

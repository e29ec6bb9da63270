//! Subscriber setup: stderr plus an append-only log file.

use pagedeck_error::{ConfigError, ConfigErrorKind};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// The level is INFO, or DEBUG with `debug`; `RUST_LOG` takes precedence
/// when set.
pub fn init(debug: bool, log_file: &Path) -> Result<(), ConfigError> {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|e| {
            ConfigError::new(ConfigErrorKind::Logging(format!(
                "{}: {}",
                log_file.display(),
                e
            )))
        })?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .map_err(|e| ConfigError::new(ConfigErrorKind::Logging(e.to_string())))
}

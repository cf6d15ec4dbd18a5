//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout carries only command output (the success
//! marker, tables, reports).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

/// Initialize the global subscriber.
///
/// `RUST_LOG` overrides `filter` when set. An unparseable filter falls
/// back to `info` with a warning rather than aborting the run.
pub fn init_logging(filter: &str, format: LogFormat) {
    let (filter_layer, invalid) =
        match EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(filter)) {
            Ok(f) => (f, false),
            Err(_) => (EnvFilter::new("info"), true),
        };

    let registry = tracing_subscriber::registry().with(filter_layer);

    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .flatten_event(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init(),
    };

    if result.is_ok() {
        if invalid {
            tracing::warn!(filter = %filter, "Invalid log filter, using 'info'");
        }
        tracing::debug!(filter = %filter, format = %format, "Logging initialized");
    }
}

/// Initialize logging for tests (with simpler output).
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}

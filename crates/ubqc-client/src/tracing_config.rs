//! Tracing subscriber setup.
//!
//! Console output for development, JSON for collection. Secret angles and
//! blind bits are only ever emitted at `trace` level.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::LoggingConfig;
use crate::error::{ClientError, ClientResult};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable console output.
    Console,
    /// JSON structured logging.
    Json,
}

impl TracingFormat {
    /// Parse a format name, defaulting to console.
    pub fn from_name(name: &str) -> Self {
        match name {
            "json" => TracingFormat::Json,
            _ => TracingFormat::Console,
        }
    }
}

/// Install the global tracing subscriber.
///
/// The configured level is used as the filter; if it does not parse,
/// `RUST_LOG` is tried, then `info`. Fails if a subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> ClientResult<()> {
    let env_filter = EnvFilter::try_new(&config.level)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = match TracingFormat::from_name(&config.format) {
        TracingFormat::Console => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .boxed(),
        TracingFormat::Json => fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ClientError::Configuration(format!("tracing already initialised: {e}")))?;

    tracing::info!(format = %config.format, "Tracing initialized");
    Ok(())
}

//! Logging initialization.
//!
//! Tracing-based structured logging with an environment-driven filter.
//! Metrics are emitted through the `metrics` facade throughout the crate;
//! installing a recorder is left to the embedding application.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Text,
    /// JSON output for log aggregation.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub default_directive: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_directive: "confidant=info".to_string(),
            format: LogFormat::Text,
        }
    }
}

static LOGGING_INIT: OnceLock<()> = OnceLock::new();

/// Initializes global logging. Safe to call more than once; only the first
/// call installs a subscriber.
pub fn init_logging(config: &LoggingConfig) {
    LOGGING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.default_directive));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true);

        let installed = match config.format {
            LogFormat::Json => builder.json().try_init(),
            LogFormat::Text => builder.try_init(),
        };
        // A subscriber installed by the host application wins.
        drop(installed);
    });
}

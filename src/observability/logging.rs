//! Structured logging.
//!
//! # Design Decisions
//! - `tracing` everywhere, with structured fields rather than formatted text
//! - Pretty output for terminals, JSON for machine consumption
//! - Logs go to stderr; stdout carries only results
//! - `RUST_LOG` overrides the configured level

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::schema::{LogFormat, LoggingConfig};

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(config: &LoggingConfig) -> String {
    format!("raw_sender={}", config.level)
}

/// Install the global subscriber. A second call is ignored.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if let Err(e) = installed {
        eprintln!("logging already initialized: {e}");
    }
}

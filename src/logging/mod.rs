// Logging module for structured logging using the tracing crate

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::{LogFormat, LoggingConfig};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{directive}': {message}")]
    InvalidFilter { directive: String, message: String },

    #[error("Failed to initialize logging: {0}")]
    InitError(String),
}

/// Initialize the tracing subscriber for structured logging
///
/// Events go to stderr so that command output on stdout stays clean. The
/// filter comes from `RUST_LOG` when set, otherwise from `config.level`.
///
/// # Errors
///
/// Returns an error if the filter directive is invalid or a global
/// subscriber is already installed.
pub fn init_subscriber(config: &LoggingConfig) -> Result<(), LoggingError> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = build_filter(rust_log.as_deref(), &config.level)?;

    let registry = Registry::default().with(filter);
    let result = match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| LoggingError::InitError(e.to_string()))
}

/// `rust_log` wins over `level` when present and non-empty.
pub fn build_filter(rust_log: Option<&str>, level: &str) -> Result<EnvFilter, LoggingError> {
    let directive = match rust_log {
        Some(value) if !value.trim().is_empty() => value,
        _ => level,
    };

    EnvFilter::try_new(directive).map_err(|e| LoggingError::InvalidFilter {
        directive: directive.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_uses_level_without_rust_log() {
        let filter = build_filter(None, "debug").unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn test_build_filter_prefers_rust_log() {
        let filter = build_filter(Some("photomark=trace"), "info").unwrap();
        assert_eq!(filter.to_string(), "photomark=trace");

        // Blank RUST_LOG falls back to the configured level
        let filter = build_filter(Some("  "), "warn").unwrap();
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn test_build_filter_rejects_garbage() {
        let err = build_filter(None, "photomark=loud").unwrap_err();
        assert!(matches!(err, LoggingError::InvalidFilter { .. }));
    }

    #[test]
    fn test_init_subscriber_twice_fails_gracefully() {
        let config = LoggingConfig::default();
        // The first call may race with other tests; the second must not panic
        let _ = init_subscriber(&config);
        assert!(init_subscriber(&config).is_err());
    }
}

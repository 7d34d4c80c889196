//! Logging setup for the `pixlabel` binary.
//!
//! Events go to `stderr` so the summary on `stdout` stays clean. The level
//! comes from `RUST_LOG` (default `info`; stage timings and the input
//! description are logged at `debug`).

use std::{env, io, str::FromStr};

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt};

const LOG_FORMAT_ENV: &str = "PIXLABEL_LOG_FORMAT";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Plain text lines.
    #[default]
    Human,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Format named by `PIXLABEL_LOG_FORMAT`, or [`LogFormat::Human`] when unset.
    pub fn from_env() -> Result<Self, LoggingError> {
        match env::var_os(LOG_FORMAT_ENV) {
            Some(raw) => raw.to_string_lossy().parse(),
            None => Ok(Self::default()),
        }
    }
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::UnsupportedFormat {
                provided: other.to_owned(),
            }),
        }
    }
}

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// `PIXLABEL_LOG_FORMAT` named something other than `human` or `json`.
    #[error("unsupported log format `{provided}`; expected `human` or `json`")]
    UnsupportedFormat {
        /// Value found in the environment.
        provided: String,
    },
    /// A global subscriber was already set.
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
    /// A global `log` logger was already set.
    #[error("failed to bridge `log` records: {0}")]
    LogBridge(#[from] tracing_log::log::SetLoggerError),
}

/// Install the global subscriber and route `log` records through it.
///
/// # Errors
/// Returns [`LoggingError`] for an unknown `PIXLABEL_LOG_FORMAT` or when a
/// global logger is already installed.
pub fn init_logging() -> Result<(), LoggingError> {
    let format = LogFormat::from_env()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);
    let layer = match format {
        LogFormat::Human => layer.boxed(),
        LogFormat::Json => layer.json().with_current_span(true).boxed(),
    };

    tracing::subscriber::set_global_default(tracing_subscriber::registry().with(filter).with(layer))?;
    LogTracer::init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("human", LogFormat::Human)]
    #[case("HUMAN", LogFormat::Human)]
    #[case(" json ", LogFormat::Json)]
    fn parses_supported_formats(#[case] raw: &str, #[case] expected: LogFormat) {
        assert_eq!(raw.parse::<LogFormat>().expect("format must parse"), expected);
    }

    #[test]
    fn rejects_unknown_format() {
        match "xml".parse::<LogFormat>() {
            Err(LoggingError::UnsupportedFormat { provided }) => assert_eq!(provided, "xml"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

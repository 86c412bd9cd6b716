//! Logging setup
//!
//! Console output is compact text for people or JSON lines for log
//! collectors. The optional file sink always writes JSON, one event per line,
//! rotated daily. `RUST_LOG` overrides the level passed in.
//!
//! # Example
//!
//! ```rust,no_run
//! use plates_core::logging::{init_logging, LogFormat};
//!
//! init_logging("info", LogFormat::Compact, Some(("logs", "plates.log"))).unwrap();
//! ```

use std::str::FromStr;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Error, Result};

/// Console log format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Single-line human readable output
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(Error::config(format!("unknown log format: {}", other))),
        }
    }
}

/// `RUST_LOG` if set and valid, otherwise `level`
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber.
///
/// `file` is `(directory, filename_prefix)` for a daily-rotated JSON log.
/// Fails if a subscriber is already installed.
pub fn init_logging(level: &str, format: LogFormat, file: Option<(&str, &str)>) -> Result<()> {
    let file_layer = match file {
        Some((directory, prefix)) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(prefix)
                .build(directory)
                .map_err(|e| Error::Internal(format!("Failed to create log appender: {}", e)))?;
            Some(fmt::layer().json().with_writer(appender))
        }
        None => None,
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(file_layer);
    let installed = match format {
        LogFormat::Compact => registry
            .with(fmt::layer().with_target(false).compact())
            .try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };
    installed.map_err(|e| Error::Internal(format!("Failed to init tracing: {}", e)))
}

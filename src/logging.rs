//! Tracing setup
//!
//! Logs go to stderr so stdout stays clean for the report.
//! `TOOLPROVIDER_LOG` takes `EnvFilter` directives and overrides the level
//! derived from `--verbose` / `--quiet`.

use std::io;

use clap::ValueEnum;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::filter::{EnvFilter, ParseError};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::layer::SubscriberExt;

/// Environment variable holding filter directives
pub const LOG_ENV_VAR: &str = "TOOLPROVIDER_LOG";

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Compact single-line format
    #[default]
    Compact,
    /// Structured JSON, one object per line
    Json,
}

/// Errors setting up the subscriber
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("invalid TOOLPROVIDER_LOG directives: {0}")]
    Filter(#[from] ParseError),

    #[error(transparent)]
    Init(#[from] TryInitError),
}

/// Level used when `TOOLPROVIDER_LOG` is unset
pub fn default_level(verbose: bool, quiet: bool) -> Level {
    if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

fn build_filter(level: Level) -> Result<EnvFilter, ParseError> {
    match std::env::var(LOG_ENV_VAR) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(format!("toolprovider={}", level)),
    }
}

/// Install the global subscriber. Fails if the filter directives are invalid.
pub fn init_tracing(format: LogFormat, level: Level) -> Result<(), LoggingError> {
    let filter = build_filter(level)?;
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Compact => {
            let layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_target(false);
            registry.with(layer).try_init()?;
        }
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_current_span(true);
            registry.with(layer).try_init()?;
        }
    }
    Ok(())
}

use std::env;
use std::io;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter; `RUST_LOG` is the fallback.
pub const LOG_ENV_VAR: &str = "HA_SWEEP_LOG";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid logging filter: {0}")]
    Filter(#[from] ParseError),
    #[error("failed to install logging subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Install a human-readable stderr subscriber. `verbose` raises the default
/// level from `info` to `debug`.
pub fn init_logging(verbose: bool) -> Result<(), LoggingError> {
    let filter = build_filter(verbose)?;
    let layer = tracing_subscriber::fmt::layer()
        .event_format(
            tracing_subscriber::fmt::format()
                .with_timer(LocalTime::rfc_3339())
                .with_level(true)
                .with_target(false),
        )
        .with_writer(io::stderr)
        .with_ansi(false);

    tracing_subscriber::registry().with(filter).with(layer).try_init()?;
    Ok(())
}

fn build_filter(verbose: bool) -> Result<EnvFilter, ParseError> {
    if let Ok(spec) = env::var(LOG_ENV_VAR) {
        if !spec.trim().is_empty() {
            return EnvFilter::try_new(spec);
        }
    }

    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(if verbose { "debug" } else { "info" }),
    }
}

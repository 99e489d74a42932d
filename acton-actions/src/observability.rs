//! Structured logging setup

use tracing_subscriber::EnvFilter;

use crate::{
    config::Config,
    error::{Error, Result},
};

/// Install a JSON `fmt` subscriber filtered by `service.log_level`
///
/// An unparsable level falls back to `info`. Fails if a global subscriber
/// is already installed.
pub fn init_tracing(config: &Config) -> Result<()> {
    let log_level = config.service.log_level.clone();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| Error::Internal(format!("Failed to install tracing subscriber: {e}")))?;

    tracing::info!("Tracing initialized for service: {}", config.service.name);

    Ok(())
}

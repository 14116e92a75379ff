//! Log output setup
//!
//! Libraries in this workspace only emit `tracing` events; nothing is printed
//! until the host process installs a subscriber. [`init_tracing`] installs
//! the standard one from a [`LoggingConfig`].

use cachegate_domain::{CacheError, Result};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install a global `tracing` subscriber
///
/// Returns `Ok(true)` when this call installed the subscriber and
/// `Ok(false)` when one was already in place, so calling it twice is
/// harmless.
///
/// # Errors
/// Returns `CacheError::Config` if `config.filter` is not a valid
/// `EnvFilter` directive.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| CacheError::Config(format!("Invalid log filter '{}': {e}", config.filter)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed =
        if config.json { builder.json().try_init().is_ok() } else { builder.try_init().is_ok() };

    if installed {
        tracing::debug!(filter = %config.filter, json = config.json, "Tracing initialized");
    }
    Ok(installed)
}

//! # Logging
//!
//! Installs the global tracing subscriber.

use crate::config::ProviderConfig;
use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber configured from `config`.
///
/// `RUST_LOG` wins when set. Otherwise the crate logs at `LOG_LEVEL`.
/// `LOG_FORMAT=json` switches to structured output.
///
/// # Errors
/// Returns an error if a global subscriber is already installed
pub fn init_tracing(config: &ProviderConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("secrets_manager_provider={}", config.log_level).into());

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.log_format.eq_ignore_ascii_case("json") {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}

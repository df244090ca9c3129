//! # Configuration
//!
//! Provider settings read from the environment.
//!
//! Every variable is optional. Missing or unparseable values fall back to the
//! defaults in [`crate::constants`], so a bare environment yields a usable
//! configuration.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `SM_REGION` | `us-south` |
//! | `SM_ENDPOINT_TYPE` | `public` |
//! | `SM_ENDPOINT_OVERRIDE` | unset |
//! | `SM_POLL_INTERVAL_SECS` | `5` |
//! | `SM_POLL_INITIAL_DELAY_SECS` | `0` |
//! | `SM_CREATE_TIMEOUT_SECS` | `2220` |
//! | `SM_HTTP_TIMEOUT_SECS` | `60` |
//! | `LOG_LEVEL` | `info` |
//! | `LOG_FORMAT` | `text` |

use crate::constants::{
    DEFAULT_CREATE_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_POLL_INITIAL_DELAY_SECS,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REGION,
};
use crate::convergence::PollPolicy;
use crate::error::Result;
use crate::model::EndpointType;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub region: String,
    pub endpoint_type: EndpointType,
    /// Replaces the derived instance URL (mock servers, proxies)
    pub endpoint_override: Option<String>,
    pub poll_interval_secs: u64,
    pub poll_initial_delay_secs: u64,
    pub create_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub log_level: String,
    pub log_format: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint_type: EndpointType::Public,
            endpoint_override: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            poll_initial_delay_secs: DEFAULT_POLL_INITIAL_DELAY_SECS,
            create_timeout_secs: DEFAULT_CREATE_TIMEOUT_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns [`crate::Error::Config`] when `SM_ENDPOINT_TYPE` names an
    /// unknown endpoint type or the poll interval is zero
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ProviderConfig::from_env`] but reads through `lookup`
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint_type = match lookup("SM_ENDPOINT_TYPE") {
            Some(raw) => EndpointType::from_str(raw.trim())?,
            None => EndpointType::Public,
        };

        let config = Self {
            region: env_var_or_default_str(&lookup, "SM_REGION", DEFAULT_REGION),
            endpoint_type,
            endpoint_override: lookup("SM_ENDPOINT_OVERRIDE")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            poll_interval_secs: env_var_or_default(
                &lookup,
                "SM_POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL_SECS,
            ),
            poll_initial_delay_secs: env_var_or_default(
                &lookup,
                "SM_POLL_INITIAL_DELAY_SECS",
                DEFAULT_POLL_INITIAL_DELAY_SECS,
            ),
            create_timeout_secs: env_var_or_default(
                &lookup,
                "SM_CREATE_TIMEOUT_SECS",
                DEFAULT_CREATE_TIMEOUT_SECS,
            ),
            http_timeout_secs: env_var_or_default(
                &lookup,
                "SM_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            ),
            log_level: env_var_or_default_str(&lookup, "LOG_LEVEL", "info"),
            log_format: env_var_or_default_str(&lookup, "LOG_FORMAT", "text"),
        };

        if config.poll_interval_secs == 0 {
            return Err(crate::error::Error::Config(
                "SM_POLL_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    /// Convergence timing derived from this configuration
    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::default()
            .with_initial_delay(Duration::from_secs(self.poll_initial_delay_secs))
            .with_interval(Duration::from_secs(self.poll_interval_secs))
            .with_timeout(Duration::from_secs(self.create_timeout_secs))
    }
}

fn env_var_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid value '{}' for {}, using default {}", raw, key, default);
            default
        }),
        None => default,
    }
}

fn env_var_or_default_str<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = ProviderConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ProviderConfig::default());
        assert_eq!(config.poll_policy(), PollPolicy::default());
    }

    #[test]
    fn test_values_are_read() {
        let config = ProviderConfig::from_lookup(lookup(&[
            ("SM_REGION", "eu-de"),
            ("SM_ENDPOINT_TYPE", "private"),
            ("SM_ENDPOINT_OVERRIDE", "http://localhost:1234"),
            ("SM_POLL_INTERVAL_SECS", "2"),
            ("SM_CREATE_TIMEOUT_SECS", "30"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.region, "eu-de");
        assert_eq!(config.endpoint_type, EndpointType::Private);
        assert_eq!(
            config.endpoint_override.as_deref(),
            Some("http://localhost:1234")
        );
        assert_eq!(config.log_format, "json");
        let policy = config.poll_policy();
        assert_eq!(policy.interval, Duration::from_secs(2));
        assert_eq!(policy.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_unparseable_number_falls_back() {
        let config =
            ProviderConfig::from_lookup(lookup(&[("SM_HTTP_TIMEOUT_SECS", "soon")])).unwrap();
        assert_eq!(config.http_timeout_secs, DEFAULT_HTTP_TIMEOUT_SECS);
    }

    #[test]
    fn test_unknown_endpoint_type_is_rejected() {
        let err =
            ProviderConfig::from_lookup(lookup(&[("SM_ENDPOINT_TYPE", "direct")])).unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(_)));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert!(ProviderConfig::from_lookup(lookup(&[("SM_POLL_INTERVAL_SECS", "0")])).is_err());
    }
}

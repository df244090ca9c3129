//! # Secrets Manager REST Transport
//!
//! Native REST implementation of [`Transport`] for the secrets-manager v2 API.
//! Uses reqwest with rustls (no OpenSSL dependencies).
//!
//! This implementation:
//! - Works directly with Pact HTTP mock servers (see [`RestTransport::with_base_url`])
//! - Sends partial updates as `application/merge-patch+json`
//! - Maps every non-2xx answer to a [`TransportError`] carrying the HTTP status,
//!   so callers can tell "not found" apart from real failures

pub mod paths;
pub mod responses;

use crate::config::ProviderConfig;
use crate::constants::MERGE_PATCH_CONTENT_TYPE;
use crate::model::{InstanceScope, Sensitive};
use crate::provider::{ApiOperation, Transport, TransportError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use responses::ApiErrorResponse;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, debug_span, info, Instrument};

/// HTTP transport bound to one secrets-manager instance
pub struct RestTransport {
    http_client: Client,
    base_url: String,
    access_token: Sensitive,
}

impl std::fmt::Debug for RestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RestTransport {
    /// Create a transport for `scope`.
    ///
    /// The endpoint is derived from the scope unless the configuration
    /// overrides it (`SM_ENDPOINT_OVERRIDE`).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(
        scope: &InstanceScope,
        access_token: impl Into<Sensitive>,
        config: &ProviderConfig,
    ) -> Result<Self> {
        let base_url = config
            .endpoint_override
            .clone()
            .unwrap_or_else(|| scope.base_url());

        info!(
            "Initializing secrets-manager REST transport for instance {} ({})",
            scope, base_url
        );

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url,
            access_token: access_token.into(),
        })
    }

    /// Transport against an explicit base URL (mock servers, proxies)
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn with_base_url(
        base_url: impl Into<String>,
        access_token: impl Into<Sensitive>,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn make_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        merge_patch: bool,
    ) -> Result<reqwest::RequestBuilder, TransportError> {
        let url = format!("{}{}", self.base_url, path);

        // Add "Bearer " prefix if not already present
        let token = self.access_token.expose();
        let auth_header = if token.starts_with("Bearer ") {
            token.to_string()
        } else {
            format!("Bearer {token}")
        };

        let mut request = self
            .http_client
            .request(method, &url)
            .header("Authorization", auth_header)
            .header("Accept", "application/json");

        if let Some(body) = body {
            let content_type = if merge_patch {
                MERGE_PATCH_CONTENT_TYPE
            } else {
                "application/json"
            };
            let bytes = serde_json::to_vec(body).map_err(|e| {
                TransportError::new(None, format!("Failed to serialize request body: {e}"))
            })?;
            request = request.header("Content-Type", content_type).body(bytes);
        }

        Ok(request)
    }

    /// Convert a non-2xx response into a transport error
    fn handle_error_response(status: StatusCode, error_text: &str) -> TransportError {
        match serde_json::from_str::<ApiErrorResponse>(error_text) {
            Ok(error_response) if !error_response.errors.is_empty() => {
                let trace = error_response
                    .trace
                    .as_deref()
                    .map(|t| format!(" [trace: {t}]"))
                    .unwrap_or_default();
                TransportError::new(
                    Some(error_response.status_code.unwrap_or(status.as_u16())),
                    format!(
                        "secrets-manager API error: {}{trace}",
                        error_response.summary()
                    ),
                )
            }
            _ => TransportError::new(
                Some(status.as_u16()),
                format!("HTTP {}: {}", status.as_u16(), error_text),
            ),
        }
    }
}

#[async_trait]
impl Transport for RestTransport {
    async fn invoke(
        &self,
        operation: &ApiOperation,
        body: Option<Value>,
    ) -> Result<Value, TransportError> {
        let route = paths::route(operation);
        let span = debug_span!(
            "secrets_manager.http",
            operation = operation.name(),
            http.method = %route.method,
            http.path = %route.path,
            http.status = tracing::field::Empty,
        );
        let span_clone = span.clone();

        async move {
            let response = self
                .make_request(
                    route.method.clone(),
                    &route.path,
                    body.as_ref(),
                    route.merge_patch,
                )?
                .send()
                .await
                .map_err(|e| {
                    TransportError::new(
                        e.status().map(|s| s.as_u16()),
                        format!("{} request failed: {e}", operation.name()),
                    )
                })?;

            let status = response.status();
            span_clone.record("http.status", status.as_u16());
            let text = response.text().await.map_err(|e| {
                TransportError::new(
                    Some(status.as_u16()),
                    format!("Failed to read response body: {e}"),
                )
            })?;

            if !status.is_success() {
                debug!("{} returned {}", operation.name(), status);
                return Err(Self::handle_error_response(status, &text));
            }

            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&text).map_err(|e| {
                TransportError::new(
                    Some(status.as_u16()),
                    format!("Failed to parse {} response: {e}", operation.name()),
                )
            })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_is_summarised() {
        let body = r#"{"errors":[{"code":"not_found","message":"Secret not found"}],"status_code":404,"trace":"abc"}"#;
        let err = RestTransport::handle_error_response(StatusCode::NOT_FOUND, body);
        assert!(err.is_not_found());
        assert_eq!(
            err.message,
            "secrets-manager API error: Secret not found (not_found) [trace: abc]"
        );
    }

    #[test]
    fn test_unparseable_error_keeps_status() {
        let err = RestTransport::handle_error_response(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.status, Some(502));
        assert_eq!(err.message, "HTTP 502: upstream down");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let transport = RestTransport::with_base_url("http://127.0.0.1:1234/", "token").unwrap();
        assert_eq!(transport.base_url(), "http://127.0.0.1:1234");
    }
}

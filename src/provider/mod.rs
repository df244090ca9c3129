//! # Provider Transport
//!
//! The single seam between the provider core and the secrets-manager API.
//!
//! Every remote call goes through [`Transport::invoke`] with an
//! [`ApiOperation`] naming what to do and an optional JSON body. The REST
//! implementation lives in [`rest`]; tests substitute scripted transports.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub mod common;
pub mod rest;

/// Remote operations the provider core issues
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    CreateSecret,
    GetSecret { id: String },
    UpdateSecretMetadata { id: String },
    DeleteSecret { id: String },
    CreateSecretVersion { secret_id: String },
    GetSecretVersionMetadata { secret_id: String, version_id: String },
    UpdateSecretVersionMetadata { secret_id: String, version_id: String },
    CreateConfiguration,
    GetConfiguration { name: String },
    UpdateConfiguration { name: String },
    DeleteConfiguration { name: String },
    CreateConfigurationAction { name: String },
}

impl ApiOperation {
    /// Stable operation name for logs, metrics and errors
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ApiOperation::CreateSecret => "create_secret",
            ApiOperation::GetSecret { .. } => "get_secret",
            ApiOperation::UpdateSecretMetadata { .. } => "update_secret_metadata",
            ApiOperation::DeleteSecret { .. } => "delete_secret",
            ApiOperation::CreateSecretVersion { .. } => "create_secret_version",
            ApiOperation::GetSecretVersionMetadata { .. } => "get_secret_version_metadata",
            ApiOperation::UpdateSecretVersionMetadata { .. } => "update_secret_version_metadata",
            ApiOperation::CreateConfiguration => "create_configuration",
            ApiOperation::GetConfiguration { .. } => "get_configuration",
            ApiOperation::UpdateConfiguration { .. } => "update_configuration",
            ApiOperation::DeleteConfiguration { .. } => "delete_configuration",
            ApiOperation::CreateConfigurationAction { .. } => "create_configuration_action",
        }
    }
}

/// Failure reported by a transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status: {})", .status.map_or_else(|| "none".to_string(), |s| s.to_string()))]
pub struct TransportError {
    /// HTTP status, when the remote answered at all
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Some(404), message)
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

/// Executes API operations against a secrets-manager instance
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run `operation` with an optional request body.
    /// Returns the response body, or `Value::Null` when there is none.
    async fn invoke(
        &self,
        operation: &ApiOperation,
        body: Option<Value>,
    ) -> Result<Value, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn invoke(
        &self,
        operation: &ApiOperation,
        body: Option<Value>,
    ) -> Result<Value, TransportError> {
        (**self).invoke(operation, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        assert!(TransportError::not_found("gone").is_not_found());
        assert!(!TransportError::new(Some(500), "boom").is_not_found());
        assert!(!TransportError::new(None, "connection refused").is_not_found());
    }

    #[test]
    fn test_display_includes_status() {
        let err = TransportError::new(Some(403), "forbidden");
        assert_eq!(err.to_string(), "forbidden (status: 403)");
        let err = TransportError::new(None, "timeout");
        assert_eq!(err.to_string(), "timeout (status: none)");
    }
}

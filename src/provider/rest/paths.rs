//! HTTP routes of the secrets-manager v2 API.

use crate::constants::API_PREFIX;
use crate::provider::ApiOperation;
use reqwest::Method;

/// Method, path and body encoding of one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    /// Path below the instance URL, including the API prefix
    pub path: String,
    /// Partial updates use JSON merge patch
    pub merge_patch: bool,
}

impl Route {
    fn new(method: Method, path: String) -> Self {
        Self {
            method,
            path,
            merge_patch: false,
        }
    }

    fn merge_patch(path: String) -> Self {
        Self {
            method: Method::PATCH,
            path,
            merge_patch: true,
        }
    }
}

#[must_use]
pub fn route(operation: &ApiOperation) -> Route {
    let secrets = format!("{API_PREFIX}/secrets");
    let configurations = format!("{API_PREFIX}/configurations");
    match operation {
        ApiOperation::CreateSecret => Route::new(Method::POST, secrets),
        ApiOperation::GetSecret { id } => Route::new(Method::GET, format!("{secrets}/{id}")),
        ApiOperation::UpdateSecretMetadata { id } => {
            Route::merge_patch(format!("{secrets}/{id}/metadata"))
        }
        ApiOperation::DeleteSecret { id } => Route::new(Method::DELETE, format!("{secrets}/{id}")),
        ApiOperation::CreateSecretVersion { secret_id } => {
            Route::new(Method::POST, format!("{secrets}/{secret_id}/versions"))
        }
        ApiOperation::GetSecretVersionMetadata {
            secret_id,
            version_id,
        } => Route::new(
            Method::GET,
            format!("{secrets}/{secret_id}/versions/{version_id}/metadata"),
        ),
        ApiOperation::UpdateSecretVersionMetadata {
            secret_id,
            version_id,
        } => Route::merge_patch(format!(
            "{secrets}/{secret_id}/versions/{version_id}/metadata"
        )),
        ApiOperation::CreateConfiguration => Route::new(Method::POST, configurations),
        ApiOperation::GetConfiguration { name } => {
            Route::new(Method::GET, format!("{configurations}/{name}"))
        }
        ApiOperation::UpdateConfiguration { name } => {
            Route::merge_patch(format!("{configurations}/{name}"))
        }
        ApiOperation::DeleteConfiguration { name } => {
            Route::new(Method::DELETE, format!("{configurations}/{name}"))
        }
        ApiOperation::CreateConfigurationAction { name } => {
            Route::new(Method::POST, format!("{configurations}/{name}/actions"))
        }
    }
}

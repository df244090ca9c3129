//! Error bodies returned by the secrets-manager API.

use serde::Deserialize;

/// Error response envelope
///
/// ```json
/// {"errors": [{"code": "not_found", "message": "..."}], "status_code": 404, "trace": "..."}
/// ```
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub errors: Vec<ApiError>,
    pub status_code: Option<u16>,
    /// Request trace id, quote it when contacting support
    pub trace: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: Option<String>,
    pub message: String,
}

impl ApiErrorResponse {
    /// All error messages joined, with their codes
    #[must_use]
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| match &e.code {
                Some(code) => format!("{} ({code})", e.message),
                None => e.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

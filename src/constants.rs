//! # Constants
//!
//! Shared constants used throughout the provider.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Default region used when neither the reference nor the environment names one
pub const DEFAULT_REGION: &str = "us-south";

/// Delay before the first convergence read (seconds)
pub const DEFAULT_POLL_INITIAL_DELAY_SECS: u64 = 0;

/// Minimum delay between two convergence reads (seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// How long a create call may wait for a converging secret (seconds)
/// 37 minutes, the create timeout public certificate orders need
pub const DEFAULT_CREATE_TIMEOUT_SECS: u64 = 37 * 60;

/// Per-request HTTP timeout (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// API prefix shared by every secrets-manager endpoint
pub const API_PREFIX: &str = "/api/v2";

/// Version selector for the current version of a secret
pub const CURRENT_VERSION: &str = "current";

/// Content type used for partial updates
pub const MERGE_PATCH_CONTENT_TYPE: &str = "application/merge-patch+json";

/// Action type submitted to the issuer when signing an intermediate CA internally
pub const SIGN_INTERMEDIATE_ACTION: &str = "private_cert_configuration_action_sign_intermediate";

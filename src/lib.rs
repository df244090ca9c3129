//! Secrets Manager Provider Library
//!
//! Resource provider core for a secrets-manager service: typed secret and
//! configuration attributes, the codec that maps them to the v2 REST API,
//! minimal update patches, lifecycle tracking, and a resource store that
//! composes them behind create/read/update/delete operations.
//!
//! - [`registry`]: closed set of secret and configuration kinds with their field tables
//! - [`codec`]: local attributes to wire payloads and back
//! - [`patch`]: partial updates restricted to mutable fields
//! - [`model`]: attribute types, lifecycle states, references
//! - [`convergence`]: waits for asynchronously created secrets
//! - [`store`]: the CRUD surface ([`SecretsManager`])
//! - [`provider`]: the [`Transport`] seam and its REST implementation

pub mod codec;
pub mod config;
pub mod constants;
pub mod convergence;
pub mod error;
pub mod model;
pub mod observability;
pub mod patch;
pub mod provider;
pub mod registry;
pub mod store;

pub use config::ProviderConfig;
pub use convergence::{ConvergencePoller, PollPolicy, WaitError};
pub use error::{Error, Result};
pub use model::{InstanceScope, ResourceRef};
pub use provider::{ApiOperation, Transport, TransportError};
pub use registry::{ConfigKind, SecretKind};
pub use store::SecretsManager;

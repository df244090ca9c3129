//! # Resource Store
//!
//! The CRUD surface of the provider: create, read, update and delete for
//! secrets ([`secrets`]) and configurations ([`configurations`]).
//!
//! A [`SecretsManager`] is bound to one [`InstanceScope`] and owns its
//! transport. References handed out by `create` have the form
//! `region/instance_id/key`; every other operation checks that the reference
//! belongs to the scope before touching the network.
//!
//! ```no_run
//! # async fn demo() -> secrets_manager_provider::Result<()> {
//! use secrets_manager_provider::config::ProviderConfig;
//! use secrets_manager_provider::model::InstanceScope;
//! use secrets_manager_provider::provider::rest::RestTransport;
//! use secrets_manager_provider::store::SecretsManager;
//!
//! let config = ProviderConfig::from_env()?;
//! let scope = InstanceScope::new(&config.region, "my-instance")
//!     .with_endpoint_type(config.endpoint_type);
//! let transport = RestTransport::new(&scope, "iam-token", &config)
//!     .map_err(|e| secrets_manager_provider::Error::Config(e.to_string()))?;
//! let manager = SecretsManager::new(transport, scope).with_poll_policy(config.poll_policy());
//! # let _ = manager;
//! # Ok(())
//! # }
//! ```

pub mod configurations;
pub mod secrets;

use crate::convergence::{ConvergencePoller, PollPolicy};
use crate::error::{Error, Result};
use crate::model::{InstanceScope, ResourceRef};
use crate::provider::{ApiOperation, Transport};
use serde_json::Value;
use tracing::debug;

/// Client for one secrets-manager instance
#[derive(Debug)]
pub struct SecretsManager<T> {
    transport: T,
    scope: InstanceScope,
    poller: ConvergencePoller,
}

impl<T: Transport> SecretsManager<T> {
    pub fn new(transport: T, scope: InstanceScope) -> Self {
        Self {
            transport,
            scope,
            poller: ConvergencePoller::default(),
        }
    }

    /// Replace the convergence timing used after creating secrets
    #[must_use]
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poller = ConvergencePoller::new(policy);
        self
    }

    #[must_use]
    pub fn scope(&self) -> &InstanceScope {
        &self.scope
    }

    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        self.poller.policy()
    }

    /// Reject references that point at another region or instance
    fn check_scope(&self, reference: &ResourceRef) -> Result<()> {
        if self.scope.contains(reference) {
            Ok(())
        } else {
            Err(Error::ScopeMismatch {
                reference: reference.to_string(),
                scope: self.scope.to_string(),
            })
        }
    }

    /// Invoke `operation`, wrapping transport failures with the operation name
    async fn call(&self, operation: ApiOperation, body: Option<Value>) -> Result<Value> {
        debug!(operation = operation.name(), "Invoking secrets-manager API");
        self.transport
            .invoke(&operation, body)
            .await
            .map_err(|e| Error::transport(operation.name(), e))
    }

    /// Like [`Self::call`] but reports a not-found answer as [`Error::NotFound`]
    async fn call_on(
        &self,
        reference: &ResourceRef,
        operation: ApiOperation,
        body: Option<Value>,
    ) -> Result<Value> {
        self.call(operation, body)
            .await
            .map_err(|e| absent_as_not_found(reference, e))
    }
}

fn absent_as_not_found(reference: &ResourceRef, error: Error) -> Error {
    if error.is_not_found() {
        Error::NotFound {
            reference: reference.to_string(),
        }
    } else {
        error
    }
}

//! Secret operations of the resource store.
//!
//! Secrets are keyed by the id the service generates on creation. Kinds whose
//! creation completes asynchronously (credential-issuing kinds, public
//! certificates with service-handled DNS) are polled until they settle.

use super::SecretsManager;
use crate::codec::{decode_secret, decode_version_metadata, encode_secret};
use crate::constants::CURRENT_VERSION;
use crate::convergence::WaitError;
use crate::error::{Error, Result};
use crate::model::{LifecycleState, ResourceRef, SecretAttributes, SecretDetails};
use crate::patch::plan_secret_update;
use crate::provider::common::OperationTracker;
use crate::provider::{ApiOperation, Transport};
use serde_json::Value;
use tracing::field::Empty;
use tracing::{debug, info, info_span, Instrument};

/// True when a freshly created secret has to be polled before use
fn needs_convergence(secret: &SecretAttributes) -> bool {
    if !secret.kind().codec().converges {
        return false;
    }
    !matches!(&secret.details, SecretDetails::PublicCert(fields) if fields.uses_manual_dns())
}

fn kind_label(prior: Option<&SecretAttributes>) -> &'static str {
    prior.map_or("secret", |p| p.kind().tag())
}

impl<T: Transport> SecretsManager<T> {
    /// Create a secret and, for asynchronously issued kinds, wait until it is usable.
    ///
    /// Returns the persisted reference together with the decoded state.
    ///
    /// # Errors
    /// - [`Error::Transport`] when the create call itself fails
    /// - [`Error::CreatedNotReady`] when the secret exists but did not settle;
    ///   the reference inside can be used to retry the wait
    /// - [`Error::CreatedIncomplete`] when the secret exists but reading it back failed
    /// - [`Error::Codec`] when the attributes cannot be encoded or the response decoded
    pub async fn create_secret(
        &self,
        desired: &SecretAttributes,
    ) -> Result<(ResourceRef, SecretAttributes)> {
        let codec = desired.kind().codec();
        let span = info_span!(
            "secrets_manager.secret.create",
            resource.kind = codec.tag,
            instance.id = %self.scope.instance_id,
            resource.id = Empty,
            operation.type = Empty,
            operation.success = Empty,
            operation.duration_ms = Empty,
            error.message = Empty,
        );
        let tracker = OperationTracker::new(span.clone(), codec.tag);
        let span_clone = span.clone();

        let result = async move {
            let body = encode_secret(desired)?;
            info!("Creating {} secret", codec.tag);
            let response = self.call(ApiOperation::CreateSecret, Some(body)).await?;
            let created = decode_secret(response, Some(codec.kind), Some(desired))?;

            let id = created
                .id()
                .map(ToString::to_string)
                .ok_or_else(|| Error::codec(codec.tag, "id", "create response carries no id"))?;
            span_clone.record("resource.id", id.as_str());
            let reference = self.scope.reference(id);

            if !needs_convergence(desired) {
                return match self.fetch_secret(&reference, Some(desired)).await {
                    Ok(secret) => Ok((reference, secret)),
                    Err(source) => Err(Error::CreatedIncomplete {
                        reference: reference.to_string(),
                        step: "read-back",
                        source: Box::new(source),
                    }),
                };
            }

            debug!("Waiting for {} to become ready", reference);
            match self.wait_for_secret(&reference, Some(desired)).await {
                Ok(ready) => Ok((reference, ready)),
                Err(source) => Err(Error::CreatedNotReady {
                    reference: reference.to_string(),
                    source: Box::new(source),
                }),
            }
        }
        .instrument(span)
        .await;

        tracker.finish("create", result)
    }

    /// Read a secret.
    ///
    /// `prior` is the last known local state. It supplies write-only members
    /// the service never returns and pins the expected kind.
    ///
    /// # Errors
    /// [`Error::NotFound`] when the secret does not exist
    pub async fn read_secret(
        &self,
        reference: &ResourceRef,
        prior: Option<&SecretAttributes>,
    ) -> Result<SecretAttributes> {
        self.check_scope(reference)?;
        let kind = kind_label(prior);
        let span = info_span!(
            "secrets_manager.secret.read",
            resource.kind = kind,
            resource.id = %reference.key,
            instance.id = %self.scope.instance_id,
            operation.type = Empty,
            operation.success = Empty,
            operation.duration_ms = Empty,
            error.message = Empty,
        );
        let tracker = OperationTracker::new(span.clone(), kind);
        let result = self.fetch_secret(reference, prior).instrument(span).await;
        tracker.finish("read", result)
    }

    /// Move a secret from `observed` to `desired`.
    ///
    /// Nothing is sent when the states already agree; `observed` is returned
    /// as is. Otherwise metadata, payload and version metadata changes are
    /// applied in that order and the secret is read back.
    ///
    /// # Errors
    /// - [`Error::ImmutableFieldConflict`] before any call when a create-only field differs
    /// - [`Error::NotFound`] when the secret is gone
    pub async fn update_secret(
        &self,
        reference: &ResourceRef,
        desired: &SecretAttributes,
        observed: &SecretAttributes,
    ) -> Result<SecretAttributes> {
        self.check_scope(reference)?;
        let kind = observed.kind().tag();
        let span = info_span!(
            "secrets_manager.secret.update",
            resource.kind = kind,
            resource.id = %reference.key,
            instance.id = %self.scope.instance_id,
            operation.type = Empty,
            operation.success = Empty,
            operation.duration_ms = Empty,
            error.message = Empty,
        );
        let tracker = OperationTracker::new(span.clone(), kind);

        let plan = match plan_secret_update(desired, observed) {
            Ok(plan) => plan,
            Err(e) => return tracker.finish("update", Err(e)),
        };
        if plan.is_empty() {
            let _entered = span.enter();
            debug!("Secret {} is up to date", reference);
            tracker.record_no_change();
            return Ok(observed.clone());
        }

        let result = async move {
            let id = reference.key.clone();

            if !plan.metadata.is_empty() {
                info!(
                    fields = ?plan.metadata.fields().keys().collect::<Vec<_>>(),
                    "Updating secret metadata"
                );
                self.call_on(
                    reference,
                    ApiOperation::UpdateSecretMetadata { id: id.clone() },
                    Some(plan.metadata.into_json()),
                )
                .await?;
            }

            if let Some(version) = plan.new_version {
                info!("Creating new secret version");
                self.call_on(
                    reference,
                    ApiOperation::CreateSecretVersion {
                        secret_id: id.clone(),
                    },
                    Some(Value::Object(version)),
                )
                .await?;
            }

            if !plan.version_metadata.is_empty() {
                info!("Updating current version metadata");
                self.call_on(
                    reference,
                    ApiOperation::UpdateSecretVersionMetadata {
                        secret_id: id,
                        version_id: CURRENT_VERSION.to_string(),
                    },
                    Some(plan.version_metadata.into_json()),
                )
                .await?;
            }

            self.fetch_secret(reference, Some(desired)).await
        }
        .instrument(span)
        .await;

        tracker.finish("update", result)
    }

    /// Delete a secret. A secret that is already gone counts as deleted.
    pub async fn delete_secret(&self, reference: &ResourceRef) -> Result<()> {
        self.check_scope(reference)?;
        let span = info_span!(
            "secrets_manager.secret.delete",
            resource.kind = "secret",
            resource.id = %reference.key,
            instance.id = %self.scope.instance_id,
            operation.type = Empty,
            operation.success = Empty,
            operation.duration_ms = Empty,
            error.message = Empty,
        );
        let tracker = OperationTracker::new(span.clone(), "secret");

        let result = async move {
            info!("Deleting secret {}", reference);
            match self
                .call(
                    ApiOperation::DeleteSecret {
                        id: reference.key.clone(),
                    },
                    None,
                )
                .await
            {
                Ok(_) => Ok(()),
                Err(e) if e.is_not_found() => {
                    debug!("Secret {} already absent", reference);
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        .instrument(span)
        .await;

        tracker.finish("delete", result)
    }

    /// Wait for an existing secret to settle, e.g. after a create that timed out.
    ///
    /// # Errors
    /// [`Error::CreatedNotReady`] carrying the reason the wait stopped
    pub async fn await_secret_ready(
        &self,
        reference: &ResourceRef,
        prior: Option<&SecretAttributes>,
    ) -> Result<SecretAttributes> {
        self.check_scope(reference)?;
        self.wait_for_secret(reference, prior)
            .await
            .map_err(|source| Error::CreatedNotReady {
                reference: reference.to_string(),
                source: Box::new(source),
            })
    }

    async fn wait_for_secret(
        &self,
        reference: &ResourceRef,
        prior: Option<&SecretAttributes>,
    ) -> std::result::Result<SecretAttributes, WaitError<SecretAttributes>> {
        self.poller
            .await_ready(&reference.key, || self.fetch_secret(reference, prior))
            .await
    }

    /// `GET` the secret and, once active, its current version metadata
    async fn fetch_secret(
        &self,
        reference: &ResourceRef,
        prior: Option<&SecretAttributes>,
    ) -> Result<SecretAttributes> {
        let body = self
            .call_on(
                reference,
                ApiOperation::GetSecret {
                    id: reference.key.clone(),
                },
                None,
            )
            .await?;
        let mut secret = decode_secret(body, prior.map(SecretAttributes::kind), prior)?;

        if secret.lifecycle_state() == Some(LifecycleState::Active) {
            let operation = ApiOperation::GetSecretVersionMetadata {
                secret_id: reference.key.clone(),
                version_id: CURRENT_VERSION.to_string(),
            };
            match self.call(operation, None).await {
                // The current version is authoritative, also when it has no metadata
                Ok(body) => secret.version_custom_metadata = decode_version_metadata(body)?,
                // Kinds without stored versions have no current version
                Err(e) if e.is_not_found() => {
                    debug!("Secret {} has no current version", reference);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Field, IamCredentialsFields, KvFields, PublicCertFields, ResourceEnvelope, SecretDetails,
    };

    fn secret(details: SecretDetails) -> SecretAttributes {
        SecretAttributes::new(ResourceEnvelope::named("s"), details)
    }

    #[test]
    fn test_convergence_depends_on_kind() {
        assert!(!needs_convergence(&secret(SecretDetails::Kv(KvFields::default()))));
        assert!(needs_convergence(&secret(SecretDetails::IamCredentials(
            IamCredentialsFields::default()
        ))));
    }

    #[test]
    fn test_manual_dns_public_cert_skips_convergence() {
        let managed = PublicCertFields {
            dns: Field::Set("cis".into()),
            ..Default::default()
        };
        let manual = PublicCertFields {
            dns: Field::Set("akamai".into()),
            ..Default::default()
        };
        assert!(needs_convergence(&secret(SecretDetails::PublicCert(managed))));
        assert!(!needs_convergence(&secret(SecretDetails::PublicCert(manual))));
    }
}

//! Configuration operations of the resource store.
//!
//! Configurations are keyed by their caller-assigned name and are ready as
//! soon as the create call returns. An intermediate CA that is signed
//! internally additionally asks its issuer to sign the CSR.

use super::SecretsManager;
use crate::codec::{decode_configuration, encode_configuration, encode_sign_intermediate};
use crate::error::{Error, Result};
use crate::model::{ConfigDetails, ConfigurationAttributes, ResourceRef};
use crate::patch::plan_configuration_update;
use crate::provider::common::OperationTracker;
use crate::provider::{ApiOperation, Transport};
use serde_json::Value;
use tracing::field::Empty;
use tracing::{debug, info, info_span, Instrument};

/// Issuer name and action body when `desired` must be signed by another CA
fn signing_request(desired: &ConfigurationAttributes, name: &str) -> Result<Option<(String, Value)>> {
    let ConfigDetails::PrivateCertIntermediateCa(fields) = &desired.details else {
        return Ok(None);
    };
    if !fields.signs_internally() {
        return Ok(None);
    }
    let issuer = fields.issuer.get().cloned().ok_or_else(|| {
        Error::codec(
            desired.kind().tag(),
            "issuer",
            "internal signing requires an issuer",
        )
    })?;
    Ok(Some((issuer, encode_sign_intermediate(name, fields))))
}

impl<T: Transport> SecretsManager<T> {
    /// Create a configuration.
    ///
    /// # Errors
    /// - [`Error::Codec`] when the name is missing, or an internally signed
    ///   intermediate CA names no issuer (both before any call)
    /// - [`Error::Transport`] when the create call fails
    /// - [`Error::CreatedIncomplete`] when the configuration exists but signing
    ///   it failed; the reference inside names the new configuration
    pub async fn create_configuration(
        &self,
        desired: &ConfigurationAttributes,
    ) -> Result<(ResourceRef, ConfigurationAttributes)> {
        let codec = desired.kind().codec();
        let span = info_span!(
            "secrets_manager.configuration.create",
            resource.kind = codec.tag,
            resource.name = desired.name().unwrap_or_default(),
            instance.id = %self.scope.instance_id,
            operation.type = Empty,
            operation.success = Empty,
            operation.duration_ms = Empty,
            error.message = Empty,
        );
        let tracker = OperationTracker::new(span.clone(), codec.tag);

        let result = async move {
            let body = encode_configuration(desired)?;
            let name = desired
                .name()
                .ok_or_else(|| Error::codec(codec.tag, "name", "configurations are keyed by name"))?;
            let signing = signing_request(desired, name)?;

            info!("Creating {} configuration {}", codec.tag, name);
            let response = self
                .call(ApiOperation::CreateConfiguration, Some(body))
                .await?;
            let created = decode_configuration(response, Some(codec.kind), Some(desired))?;
            let reference = self.scope.reference(created.name().unwrap_or(name));

            let Some((issuer, action)) = signing else {
                return Ok((reference, created));
            };

            info!("Signing intermediate CA {} with issuer {}", name, issuer);
            let signed: Result<ConfigurationAttributes> = async {
                self.call(
                    ApiOperation::CreateConfigurationAction { name: issuer },
                    Some(action),
                )
                .await?;
                self.fetch_configuration(&reference, Some(desired)).await
            }
            .await;
            match signed {
                Ok(signed) => Ok((reference, signed)),
                Err(source) => Err(Error::CreatedIncomplete {
                    reference: reference.to_string(),
                    step: "signing",
                    source: Box::new(source),
                }),
            }
        }
        .instrument(span)
        .await;

        tracker.finish("create", result)
    }

    /// Read a configuration by reference.
    ///
    /// # Errors
    /// [`Error::NotFound`] when no configuration has that name
    pub async fn read_configuration(
        &self,
        reference: &ResourceRef,
        prior: Option<&ConfigurationAttributes>,
    ) -> Result<ConfigurationAttributes> {
        self.check_scope(reference)?;
        let kind = prior.map_or("configuration", |p| p.kind().tag());
        let span = info_span!(
            "secrets_manager.configuration.read",
            resource.kind = kind,
            resource.name = %reference.key,
            instance.id = %self.scope.instance_id,
            operation.type = Empty,
            operation.success = Empty,
            operation.duration_ms = Empty,
            error.message = Empty,
        );
        let tracker = OperationTracker::new(span.clone(), kind);
        let result = self
            .fetch_configuration(reference, prior)
            .instrument(span)
            .await;
        tracker.finish("read", result)
    }

    /// Apply the mutable differences between `desired` and `observed`.
    ///
    /// # Errors
    /// - [`Error::ImmutableFieldConflict`] before any call when a create-only field differs
    /// - [`Error::NotFound`] when the configuration is gone
    pub async fn update_configuration(
        &self,
        reference: &ResourceRef,
        desired: &ConfigurationAttributes,
        observed: &ConfigurationAttributes,
    ) -> Result<ConfigurationAttributes> {
        self.check_scope(reference)?;
        let kind = observed.kind().tag();
        let span = info_span!(
            "secrets_manager.configuration.update",
            resource.kind = kind,
            resource.name = %reference.key,
            instance.id = %self.scope.instance_id,
            operation.type = Empty,
            operation.success = Empty,
            operation.duration_ms = Empty,
            error.message = Empty,
        );
        let tracker = OperationTracker::new(span.clone(), kind);

        let patch = match plan_configuration_update(desired, observed) {
            Ok(patch) => patch,
            Err(e) => return tracker.finish("update", Err(e)),
        };
        if patch.is_empty() {
            let _entered = span.enter();
            debug!("Configuration {} is up to date", reference);
            tracker.record_no_change();
            return Ok(observed.clone());
        }

        let result = async move {
            info!(
                fields = ?patch.fields().keys().collect::<Vec<_>>(),
                "Updating configuration"
            );
            let response = self
                .call_on(
                    reference,
                    ApiOperation::UpdateConfiguration {
                        name: reference.key.clone(),
                    },
                    Some(patch.into_json()),
                )
                .await?;
            if response.is_null() {
                return self.fetch_configuration(reference, Some(desired)).await;
            }
            decode_configuration(response, Some(observed.kind()), Some(desired))
        }
        .instrument(span)
        .await;

        tracker.finish("update", result)
    }

    /// Delete a configuration. An absent configuration counts as deleted.
    pub async fn delete_configuration(&self, reference: &ResourceRef) -> Result<()> {
        self.check_scope(reference)?;
        let span = info_span!(
            "secrets_manager.configuration.delete",
            resource.kind = "configuration",
            resource.name = %reference.key,
            instance.id = %self.scope.instance_id,
            operation.type = Empty,
            operation.success = Empty,
            operation.duration_ms = Empty,
            error.message = Empty,
        );
        let tracker = OperationTracker::new(span.clone(), "configuration");

        let result = async move {
            info!("Deleting configuration {}", reference);
            match self
                .call(
                    ApiOperation::DeleteConfiguration {
                        name: reference.key.clone(),
                    },
                    None,
                )
                .await
            {
                Ok(_) => Ok(()),
                Err(e) if e.is_not_found() => {
                    debug!("Configuration {} already absent", reference);
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        .instrument(span)
        .await;

        tracker.finish("delete", result)
    }

    async fn fetch_configuration(
        &self,
        reference: &ResourceRef,
        prior: Option<&ConfigurationAttributes>,
    ) -> Result<ConfigurationAttributes> {
        let body = self
            .call_on(
                reference,
                ApiOperation::GetConfiguration {
                    name: reference.key.clone(),
                },
                None,
            )
            .await?;
        decode_configuration(body, prior.map(ConfigurationAttributes::kind), prior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, IntermediateCaFields};

    fn intermediate(signing_method: &str, issuer: Option<&str>) -> ConfigurationAttributes {
        ConfigurationAttributes::new(
            "intermediate",
            ConfigDetails::PrivateCertIntermediateCa(IntermediateCaFields {
                signing_method: Field::Set(signing_method.into()),
                issuer: issuer.map(ToString::to_string).into(),
                ..Default::default()
            }),
        )
    }

    #[test]
    fn test_external_signing_sends_no_action() {
        let desired = intermediate("external", None);
        assert!(signing_request(&desired, "intermediate").unwrap().is_none());
    }

    #[test]
    fn test_internal_signing_targets_issuer() {
        let desired = intermediate("internal", Some("root"));
        let (issuer, action) = signing_request(&desired, "intermediate").unwrap().unwrap();
        assert_eq!(issuer, "root");
        assert_eq!(
            action["action_type"],
            "private_cert_configuration_action_sign_intermediate"
        );
        assert_eq!(action["intermediate_certificate_authority"], "intermediate");
    }

    #[test]
    fn test_internal_signing_without_issuer_is_rejected() {
        let desired = intermediate("internal", None);
        let err = signing_request(&desired, "intermediate").unwrap_err();
        assert!(matches!(err, Error::Codec { field: "issuer", .. }));
    }
}

//! Resource store tests against a scripted transport
//!
//! Covers the create/read/update/delete flows for secrets and configurations,
//! including convergence after create, no-op updates and idempotent deletes.

mod common;

use common::{scope, secret_body, ScriptedTransport};
use secrets_manager_provider::model::{
    CaSubject, CertificateAuthorityFields, ConfigDetails, ConfigurationAttributes, Field,
    IamCredentialsFields, IntermediateCaFields, KvFields, LifecycleState, PublicCertFields,
    ResourceEnvelope, RotationPolicy, SecretAttributes, SecretDetails, TtlValue,
};
use secrets_manager_provider::{Error, PollPolicy, ResourceRef, SecretsManager, WaitError};
use serde_json::{json, Map};
use std::sync::Arc;
use std::time::Duration;

fn manager(transport: &Arc<ScriptedTransport>) -> SecretsManager<Arc<ScriptedTransport>> {
    SecretsManager::new(Arc::clone(transport), scope()).with_poll_policy(
        PollPolicy::default()
            .with_interval(Duration::from_secs(5))
            .with_timeout(Duration::from_secs(20)),
    )
}

fn kv_secret(description: &str, user: &str) -> SecretAttributes {
    let mut data = Map::new();
    data.insert("user".into(), json!(user));
    SecretAttributes::new(
        ResourceEnvelope {
            name: Field::Set("app-secret".into()),
            description: Field::Set(description.into()),
            ..Default::default()
        },
        SecretDetails::Kv(KvFields {
            data: Field::Set(data),
        }),
    )
}

fn kv_body(id: &str, description: &str, user: &str) -> serde_json::Value {
    secret_body(
        "kv",
        id,
        1,
        json!({
            "description": description,
            "secret_group_id": "default",
            "data": {"user": user},
        }),
    )
}

fn iam_secret() -> SecretAttributes {
    SecretAttributes::new(
        ResourceEnvelope::named("app-secret"),
        SecretDetails::IamCredentials(IamCredentialsFields {
            ttl: Field::Set(TtlValue::parse("1h").unwrap()),
            access_groups: Field::Set(vec!["AccessGroupId-1".into()]),
            reuse_api_key: Field::Set(true),
            rotation: Field::Set(RotationPolicy::Common {
                auto_rotate: Field::Set(true),
                interval: Field::Set(1),
                unit: Field::Set("day".into()),
            }),
            ..Default::default()
        }),
    )
}

fn iam_body(state: i64) -> serde_json::Value {
    secret_body(
        "iam_credentials",
        "iam-1",
        state,
        json!({
            "ttl": "3600",
            "access_groups": ["AccessGroupId-1"],
            "reuse_api_key": true,
            "rotation": {"auto_rotate": true, "interval": 1, "unit": "day"},
        }),
    )
}

/// Read `reference` once so tests start from an observed state
async fn observe(
    manager: &SecretsManager<Arc<ScriptedTransport>>,
    transport: &ScriptedTransport,
    reference: &ResourceRef,
    body: serde_json::Value,
    prior: &SecretAttributes,
) -> SecretAttributes {
    transport
        .respond("get_secret", body)
        .fail("get_secret_version_metadata", 404, "no versions");
    manager.read_secret(reference, Some(prior)).await.unwrap()
}

#[tokio::test]
async fn test_create_kv_secret_returns_reference() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .respond("create_secret", kv_body("kv-1", "demo", "app"))
        .respond("get_secret", kv_body("kv-1", "demo", "app"))
        .respond(
            "get_secret_version_metadata",
            json!({"id": "v1", "version_custom_metadata": {"build": "7"}}),
        );
    let manager = manager(&transport);

    let (reference, created) = manager.create_secret(&kv_secret("demo", "app")).await.unwrap();

    assert_eq!(reference.to_string(), "us-south/instance-1/kv-1");
    assert!(created.envelope.crn.is_set());
    assert_eq!(
        transport.operation_names(),
        vec!["create_secret", "get_secret", "get_secret_version_metadata"]
    );
    // The read-back fills what the create response lacks
    let metadata = created.version_custom_metadata.get().unwrap();
    assert_eq!(metadata.get("build").map(String::as_str), Some("7"));

    let body = transport.calls()[0].body.clone().unwrap();
    assert_eq!(body["secret_type"], "kv");
    assert_eq!(body["name"], "app-secret");
    assert_eq!(body["data"], json!({"user": "app"}));
    assert!(body.get("id").is_none());
}

#[tokio::test]
async fn test_failed_read_back_keeps_the_reference() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .respond("create_secret", kv_body("kv-1", "demo", "app"))
        .fail("get_secret", 503, "unavailable");
    let manager = manager(&transport);

    let err = manager
        .create_secret(&kv_secret("demo", "app"))
        .await
        .unwrap_err();

    let Error::CreatedIncomplete {
        reference,
        step,
        source,
    } = err
    else {
        panic!("expected CreatedIncomplete");
    };
    assert_eq!(reference, "us-south/instance-1/kv-1");
    assert_eq!(step, "read-back");
    assert!(matches!(
        *source,
        Error::Transport {
            operation: "get_secret",
            ..
        }
    ));
}

#[tokio::test]
async fn test_create_call_failure_is_a_transport_error() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.fail("create_secret", 400, "bad request");
    let manager = manager(&transport);

    let err = manager
        .create_secret(&kv_secret("demo", "app"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Transport {
            operation: "create_secret",
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_create_iam_credentials_waits_until_active() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .respond("create_secret", iam_body(0))
        .respond("get_secret", iam_body(0))
        .respond("get_secret", iam_body(1))
        .fail("get_secret_version_metadata", 404, "no versions");
    let manager = manager(&transport);

    let (reference, ready) = manager.create_secret(&iam_secret()).await.unwrap();

    assert_eq!(reference.key, "iam-1");
    assert_eq!(ready.lifecycle_state(), Some(LifecycleState::Active));
    assert_eq!(transport.calls_to("get_secret").len(), 2);
    // The configured spelling survives the server's seconds
    let SecretDetails::IamCredentials(fields) = &ready.details else {
        panic!("expected iam credentials");
    };
    assert_eq!(fields.ttl.get().and_then(TtlValue::configured), Some("1h"));
}

#[tokio::test(start_paused = true)]
async fn test_create_that_never_settles_is_created_not_ready() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond("create_secret", iam_body(0));
    for _ in 0..10 {
        transport.respond("get_secret", iam_body(0));
    }
    let manager = manager(&transport);
    let start = tokio::time::Instant::now();

    let err = manager.create_secret(&iam_secret()).await.unwrap_err();

    let Error::CreatedNotReady { reference, source } = err else {
        panic!("expected CreatedNotReady");
    };
    assert_eq!(reference, "us-south/instance-1/iam-1");
    assert!(matches!(*source, WaitError::Timeout { reads: 4, .. }));
    assert_eq!(
        source.last_observed().and_then(SecretAttributes::lifecycle_state),
        Some(LifecycleState::PreActivation)
    );
    assert_eq!(transport.calls_to("get_secret").len(), 4);
    assert_eq!(start.elapsed(), Duration::from_secs(20));
}

#[tokio::test(start_paused = true)]
async fn test_create_that_is_destroyed_reports_failed_state() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .respond("create_secret", iam_body(0))
        .respond("get_secret", iam_body(0))
        .respond("get_secret", iam_body(5));
    let manager = manager(&transport);

    let err = manager.create_secret(&iam_secret()).await.unwrap_err();

    let Error::CreatedNotReady { source, .. } = err else {
        panic!("expected CreatedNotReady");
    };
    assert!(matches!(
        *source,
        WaitError::Failed {
            state: LifecycleState::Destroyed,
            ..
        }
    ));
    assert_eq!(transport.calls_to("get_secret").len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_secret_vanishing_during_wait_is_distinct() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .respond("create_secret", iam_body(0))
        .fail("get_secret", 404, "Secret not found");
    let manager = manager(&transport);

    let err = manager.create_secret(&iam_secret()).await.unwrap_err();

    let Error::CreatedNotReady { source, .. } = err else {
        panic!("expected CreatedNotReady");
    };
    assert!(matches!(*source, WaitError::NotFoundDuringWait { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_wait_can_be_retried_after_timeout() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .respond("get_secret", iam_body(1))
        .fail("get_secret_version_metadata", 404, "no versions");
    let manager = manager(&transport);
    let reference = scope().reference("iam-1");

    let ready = manager
        .await_secret_ready(&reference, Some(&iam_secret()))
        .await
        .unwrap();
    assert_eq!(ready.lifecycle_state(), Some(LifecycleState::Active));
}

#[tokio::test]
async fn test_public_cert_with_manual_dns_skips_convergence() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond(
        "create_secret",
        secret_body(
            "public_cert",
            "cert-1",
            0,
            json!({"common_name": "example.com", "ca": "le", "dns": "manual"}),
        ),
    );
    transport.respond(
        "get_secret",
        secret_body(
            "public_cert",
            "cert-1",
            0,
            json!({"common_name": "example.com", "ca": "le", "dns": "manual"}),
        ),
    );
    let manager = manager(&transport);
    let desired = SecretAttributes::new(
        ResourceEnvelope::named("app-secret"),
        SecretDetails::PublicCert(PublicCertFields {
            common_name: Field::Set("example.com".into()),
            ca: Field::Set("le".into()),
            dns: Field::Set("akamai".into()),
            ..Default::default()
        }),
    );

    let (_, created) = manager.create_secret(&desired).await.unwrap();

    // One read-back, no polling
    assert_eq!(transport.operation_names(), vec!["create_secret", "get_secret"]);
    assert_eq!(transport.calls()[0].body.as_ref().unwrap()["dns"], "manual");
    let SecretDetails::PublicCert(fields) = &created.details else {
        panic!("expected public cert");
    };
    assert_eq!(fields.dns.get().map(String::as_str), Some("akamai"));
}

#[tokio::test]
async fn test_read_missing_secret_is_not_found() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.fail("get_secret", 404, "Secret not found");
    let manager = manager(&transport);

    let err = manager
        .read_secret(&scope().reference("gone"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_read_active_secret_fetches_version_metadata() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .respond("get_secret", kv_body("kv-1", "demo", "app"))
        .respond(
            "get_secret_version_metadata",
            json!({"id": "v1", "version_custom_metadata": {"build": "42"}}),
        );
    let manager = manager(&transport);

    let secret = manager
        .read_secret(&scope().reference("kv-1"), None)
        .await
        .unwrap();

    let metadata = secret.version_custom_metadata.get().unwrap();
    assert_eq!(metadata.get("build").map(String::as_str), Some("42"));
    let version_call = &transport.calls_to("get_secret_version_metadata")[0];
    assert_eq!(
        version_call.operation,
        secrets_manager_provider::ApiOperation::GetSecretVersionMetadata {
            secret_id: "kv-1".into(),
            version_id: "current".into(),
        }
    );
}

#[tokio::test]
async fn test_removed_version_metadata_shows_as_absent() {
    let transport = Arc::new(ScriptedTransport::new());
    let manager = manager(&transport);
    let reference = scope().reference("kv-1");
    let mut prior = kv_secret("demo", "app");
    prior.version_custom_metadata = Field::Set([("build".to_string(), "42".to_string())].into());

    transport
        .respond("get_secret", kv_body("kv-1", "demo", "app"))
        .respond("get_secret_version_metadata", json!({"id": "v1"}));
    let secret = manager.read_secret(&reference, Some(&prior)).await.unwrap();
    assert!(secret.version_custom_metadata.is_absent());

    // Without a current version the local value stands
    transport
        .respond("get_secret", kv_body("kv-1", "demo", "app"))
        .fail("get_secret_version_metadata", 404, "no versions");
    let secret = manager.read_secret(&reference, Some(&prior)).await.unwrap();
    assert_eq!(secret.version_custom_metadata, prior.version_custom_metadata);
}

#[tokio::test]
async fn test_reference_from_another_instance_is_rejected() {
    let transport = Arc::new(ScriptedTransport::new());
    let manager = manager(&transport);
    let foreign = ResourceRef::parse("eu-de/instance-1/kv-1").unwrap();

    let err = manager.read_secret(&foreign, None).await.unwrap_err();
    assert!(matches!(err, Error::ScopeMismatch { .. }));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_update_without_changes_makes_no_calls() {
    let transport = Arc::new(ScriptedTransport::new());
    let manager = manager(&transport);
    let reference = scope().reference("kv-1");
    let desired = kv_secret("demo", "app");
    let observed = observe(
        &manager,
        &transport,
        &reference,
        kv_body("kv-1", "demo", "app"),
        &desired,
    )
    .await;
    let before = transport.calls().len();

    let updated = manager
        .update_secret(&reference, &desired, &observed)
        .await
        .unwrap();

    assert_eq!(transport.calls().len(), before);
    assert_eq!(updated, observed);
}

#[tokio::test]
async fn test_update_description_patches_metadata_only() {
    let transport = Arc::new(ScriptedTransport::new());
    let manager = manager(&transport);
    let reference = scope().reference("kv-1");
    let observed = observe(
        &manager,
        &transport,
        &reference,
        kv_body("kv-1", "demo", "app"),
        &kv_secret("demo", "app"),
    )
    .await;
    transport
        .respond("update_secret_metadata", json!({}))
        .respond("get_secret", kv_body("kv-1", "changed", "app"))
        .fail("get_secret_version_metadata", 404, "no versions");

    let desired = kv_secret("changed", "app");
    let updated = manager
        .update_secret(&reference, &desired, &observed)
        .await
        .unwrap();

    let patches = transport.calls_to("update_secret_metadata");
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].body, Some(json!({"description": "changed"})));
    assert!(transport.calls_to("create_secret_version").is_empty());
    assert_eq!(
        updated.envelope.description.get().map(String::as_str),
        Some("changed")
    );
}

#[tokio::test]
async fn test_update_payload_creates_new_version() {
    let transport = Arc::new(ScriptedTransport::new());
    let manager = manager(&transport);
    let reference = scope().reference("kv-1");
    let observed = observe(
        &manager,
        &transport,
        &reference,
        kv_body("kv-1", "demo", "app"),
        &kv_secret("demo", "app"),
    )
    .await;
    transport
        .respond("create_secret_version", json!({"id": "v2"}))
        .respond("get_secret", kv_body("kv-1", "demo", "admin"))
        .fail("get_secret_version_metadata", 404, "no versions");

    manager
        .update_secret(&reference, &kv_secret("demo", "admin"), &observed)
        .await
        .unwrap();

    let versions = transport.calls_to("create_secret_version");
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].body, Some(json!({"data": {"user": "admin"}})));
    assert!(transport.calls_to("update_secret_metadata").is_empty());
    assert!(transport.calls_to("update_secret_version_metadata").is_empty());
}

#[tokio::test]
async fn test_update_of_create_only_field_is_rejected_before_any_call() {
    let transport = Arc::new(ScriptedTransport::new());
    let manager = manager(&transport);
    let reference = scope().reference("kv-1");
    let observed = observe(
        &manager,
        &transport,
        &reference,
        kv_body("kv-1", "demo", "app"),
        &kv_secret("demo", "app"),
    )
    .await;
    let before = transport.calls().len();

    let mut desired = kv_secret("demo", "app");
    desired.envelope.secret_group_id = Field::Set("other-group".into());
    let err = manager
        .update_secret(&reference, &desired, &observed)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::ImmutableFieldConflict {
            field: "secret_group_id",
            ..
        }
    ));
    assert_eq!(transport.calls().len(), before);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.fail("delete_secret", 404, "Secret not found");
    let manager = manager(&transport);

    manager
        .delete_secret(&scope().reference("gone"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_failure_is_reported() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.fail("delete_secret", 403, "Forbidden");
    let manager = manager(&transport);

    let err = manager
        .delete_secret(&scope().reference("kv-1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Transport {
            operation: "delete_secret",
            ..
        }
    ));
}

fn intermediate_ca(issuer: Option<&str>) -> ConfigurationAttributes {
    ConfigurationAttributes::new(
        "intermediate",
        ConfigDetails::PrivateCertIntermediateCa(IntermediateCaFields {
            ca: CertificateAuthorityFields {
                max_ttl: Field::Set(TtlValue::parse("8760h").unwrap()),
                subject: CaSubject {
                    common_name: Field::Set("example.com".into()),
                    ..Default::default()
                },
                ..Default::default()
            },
            signing_method: Field::Set("internal".into()),
            issuer: issuer.map(ToString::to_string).into(),
        }),
    )
}

fn intermediate_body(status: &str) -> serde_json::Value {
    json!({
        "config_type": "private_cert_configuration_intermediate_ca",
        "secret_type": "private_cert",
        "name": "intermediate",
        "max_ttl_seconds": 31_536_000,
        "common_name": "example.com",
        "signing_method": "internal",
        "issuer": "root",
        "status": status,
        "created_at": "2024-01-01T00:00:00Z",
    })
}

#[tokio::test]
async fn test_internally_signed_intermediate_ca_is_signed_by_issuer() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .respond("create_configuration", intermediate_body("signing_required"))
        .respond(
            "create_configuration_action",
            json!({"action_type": "private_cert_configuration_action_sign_intermediate"}),
        )
        .respond("get_configuration", intermediate_body("configured"));
    let manager = manager(&transport);

    let (reference, signed) = manager
        .create_configuration(&intermediate_ca(Some("root")))
        .await
        .unwrap();

    assert_eq!(reference.to_string(), "us-south/instance-1/intermediate");
    assert_eq!(
        transport.operation_names(),
        vec![
            "create_configuration",
            "create_configuration_action",
            "get_configuration"
        ]
    );
    let action = &transport.calls_to("create_configuration_action")[0];
    assert_eq!(
        action.operation,
        secrets_manager_provider::ApiOperation::CreateConfigurationAction {
            name: "root".into()
        }
    );
    let body = action.body.as_ref().unwrap();
    assert_eq!(body["intermediate_certificate_authority"], "intermediate");
    assert_eq!(body["common_name"], "example.com");

    let ConfigDetails::PrivateCertIntermediateCa(fields) = &signed.details else {
        panic!("expected intermediate CA");
    };
    assert_eq!(fields.ca.status.get().map(String::as_str), Some("configured"));
    assert_eq!(
        fields.ca.max_ttl.get().and_then(TtlValue::configured),
        Some("8760h")
    );
}

#[tokio::test]
async fn test_failed_signing_keeps_the_new_configuration_reference() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .respond("create_configuration", intermediate_body("signing_required"))
        .fail("create_configuration_action", 500, "issuer busy");
    let manager = manager(&transport);

    let err = manager
        .create_configuration(&intermediate_ca(Some("root")))
        .await
        .unwrap_err();

    let Error::CreatedIncomplete {
        reference,
        step,
        source,
    } = err
    else {
        panic!("expected CreatedIncomplete");
    };
    assert_eq!(reference, "us-south/instance-1/intermediate");
    assert_eq!(step, "signing");
    assert!(matches!(
        *source,
        Error::Transport {
            operation: "create_configuration_action",
            ..
        }
    ));
    assert_eq!(
        transport.operation_names(),
        vec!["create_configuration", "create_configuration_action"]
    );
}

#[tokio::test]
async fn test_internal_signing_without_issuer_fails_before_any_call() {
    let transport = Arc::new(ScriptedTransport::new());
    let manager = manager(&transport);

    let err = manager
        .create_configuration(&intermediate_ca(None))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Codec { field: "issuer", .. }));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_configuration_update_sends_only_changed_mutable_fields() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond("get_configuration", intermediate_body("configured"));
    let manager = manager(&transport);
    let reference = scope().reference("intermediate");
    let prior = intermediate_ca(Some("root"));
    let observed = manager
        .read_configuration(&reference, Some(&prior))
        .await
        .unwrap();

    // Same duration in another spelling is not a change
    let mut desired = prior.clone();
    if let ConfigDetails::PrivateCertIntermediateCa(fields) = &mut desired.details {
        fields.ca.max_ttl = Field::Set(TtlValue::parse("525600m").unwrap());
    }
    let unchanged = manager
        .update_configuration(&reference, &desired, &observed)
        .await
        .unwrap();
    assert_eq!(unchanged, observed);
    assert!(transport.calls_to("update_configuration").is_empty());

    if let ConfigDetails::PrivateCertIntermediateCa(fields) = &mut desired.details {
        fields.ca.max_ttl = Field::Set(TtlValue::parse("720h").unwrap());
    }
    let mut response = intermediate_body("configured");
    response["max_ttl_seconds"] = json!(2_592_000);
    transport.respond("update_configuration", response);

    let updated = manager
        .update_configuration(&reference, &desired, &observed)
        .await
        .unwrap();

    let patches = transport.calls_to("update_configuration");
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].body, Some(json!({"max_ttl": "720h"})));
    let ConfigDetails::PrivateCertIntermediateCa(fields) = &updated.details else {
        panic!("expected intermediate CA");
    };
    assert_eq!(
        fields.ca.max_ttl.get().and_then(TtlValue::configured),
        Some("720h")
    );
}

#[tokio::test]
async fn test_configuration_common_name_cannot_change() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond("get_configuration", intermediate_body("configured"));
    let manager = manager(&transport);
    let reference = scope().reference("intermediate");
    let prior = intermediate_ca(Some("root"));
    let observed = manager
        .read_configuration(&reference, Some(&prior))
        .await
        .unwrap();

    let mut desired = prior;
    if let ConfigDetails::PrivateCertIntermediateCa(fields) = &mut desired.details {
        fields.ca.subject.common_name = Field::Set("other.example.com".into());
    }
    let err = manager
        .update_configuration(&reference, &desired, &observed)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::ImmutableFieldConflict {
            field: "common_name",
            ..
        }
    ));
}

#[tokio::test]
async fn test_delete_missing_configuration_succeeds() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.fail("delete_configuration", 404, "Configuration not found");
    let manager = manager(&transport);

    manager
        .delete_configuration(&scope().reference("intermediate"))
        .await
        .unwrap();
}

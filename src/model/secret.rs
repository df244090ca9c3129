//! # Secret Attributes
//!
//! Local representation of a secret: the shared [`ResourceEnvelope`], the
//! version-scoped metadata and one kind-specific attribute block.
//!
//! Members the remote computes (certificates, API keys, serial numbers) live
//! in the same blocks as the user-settable ones; the variant registry decides
//! which of them may be sent on create or patched.

use crate::model::{Field, LifecycleState, ResourceEnvelope, RotationPolicy, Sensitive, TtlValue};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Decoded (or desired) state of one secret
#[derive(Debug, Clone, PartialEq)]
pub struct SecretAttributes {
    pub envelope: ResourceEnvelope,
    /// Metadata attached to the current version rather than the secret
    pub version_custom_metadata: Field<BTreeMap<String, String>>,
    pub details: SecretDetails,
    /// Wire members this crate does not model, kept for callers that need them
    pub extra: Map<String, Value>,
}

impl SecretAttributes {
    #[must_use]
    pub fn new(envelope: ResourceEnvelope, details: SecretDetails) -> Self {
        Self {
            envelope,
            version_custom_metadata: Field::Absent,
            details,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> crate::registry::SecretKind {
        self.details.kind()
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.envelope.id.get().map(String::as_str)
    }

    #[must_use]
    pub fn lifecycle_state(&self) -> Option<LifecycleState> {
        self.envelope.lifecycle.as_ref().map(|status| status.state)
    }
}

/// Kind-specific attributes, one variant per secret kind
#[derive(Debug, Clone, PartialEq)]
pub enum SecretDetails {
    Arbitrary(ArbitraryFields),
    IamCredentials(IamCredentialsFields),
    ImportedCert(ImportedCertFields),
    Kv(KvFields),
    PrivateCert(PrivateCertFields),
    PublicCert(PublicCertFields),
    ServiceCredentials(ServiceCredentialsFields),
    UsernamePassword(UsernamePasswordFields),
}

impl SecretDetails {
    #[must_use]
    pub fn kind(&self) -> crate::registry::SecretKind {
        use crate::registry::SecretKind;
        match self {
            SecretDetails::Arbitrary(_) => SecretKind::Arbitrary,
            SecretDetails::IamCredentials(_) => SecretKind::IamCredentials,
            SecretDetails::ImportedCert(_) => SecretKind::ImportedCert,
            SecretDetails::Kv(_) => SecretKind::Kv,
            SecretDetails::PrivateCert(_) => SecretKind::PrivateCert,
            SecretDetails::PublicCert(_) => SecretKind::PublicCert,
            SecretDetails::ServiceCredentials(_) => SecretKind::ServiceCredentials,
            SecretDetails::UsernamePassword(_) => SecretKind::UsernamePassword,
        }
    }

    /// Rotation policy, for kinds that carry one
    #[must_use]
    pub fn rotation(&self) -> Option<&Field<RotationPolicy>> {
        match self {
            SecretDetails::IamCredentials(f) => Some(&f.rotation),
            SecretDetails::PrivateCert(f) => Some(&f.rotation),
            SecretDetails::PublicCert(f) => Some(&f.rotation),
            SecretDetails::ServiceCredentials(f) => Some(&f.rotation),
            SecretDetails::UsernamePassword(f) => Some(&f.rotation),
            SecretDetails::Arbitrary(_) | SecretDetails::ImportedCert(_) | SecretDetails::Kv(_) => {
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArbitraryFields {
    pub payload: Field<Sensitive>,
    pub expiration_date: Field<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct KvFields {
    pub data: Field<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UsernamePasswordFields {
    pub username: Field<String>,
    /// Changing the password creates a new secret version
    pub password: Field<Sensitive>,
    pub expiration_date: Field<DateTime<Utc>>,
    pub rotation: Field<RotationPolicy>,
    pub next_rotation_date: Field<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IamCredentialsFields {
    pub ttl: Field<TtlValue>,
    pub access_groups: Field<Vec<String>>,
    pub service_id: Field<String>,
    pub reuse_api_key: Field<bool>,
    pub rotation: Field<RotationPolicy>,
    pub api_key: Field<Sensitive>,
    pub api_key_id: Field<String>,
    pub service_id_is_static: Field<bool>,
    pub account_id: Field<String>,
    pub next_rotation_date: Field<DateTime<Utc>>,
}

/// Service instance whose credentials a `service_credentials` secret wraps
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceService {
    pub instance_crn: Field<String>,
    pub role_crn: Field<String>,
    pub parameters: Field<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServiceCredentialsFields {
    pub ttl: Field<TtlValue>,
    pub source_service: Field<SourceService>,
    pub rotation: Field<RotationPolicy>,
    /// Generated credentials, opaque to this crate
    pub credentials: Field<Value>,
    pub next_rotation_date: Field<DateTime<Utc>>,
}

/// Certificate members the remote reports for every certificate kind
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IssuedCertificate {
    pub certificate: Field<String>,
    pub intermediate: Field<String>,
    pub private_key: Field<Sensitive>,
    pub issuer: Field<String>,
    pub serial_number: Field<String>,
    pub expiration_date: Field<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportedCertFields {
    pub certificate: Field<String>,
    pub intermediate: Field<String>,
    pub private_key: Field<Sensitive>,
    pub common_name: Field<String>,
    pub alt_names: Field<Vec<String>>,
    pub key_algorithm: Field<String>,
    pub issuer: Field<String>,
    pub serial_number: Field<String>,
    pub expiration_date: Field<DateTime<Utc>>,
    pub intermediate_included: Field<bool>,
    pub private_key_included: Field<bool>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PublicCertFields {
    pub common_name: Field<String>,
    pub alt_names: Field<Vec<String>>,
    pub key_algorithm: Field<String>,
    /// Name of the CA configuration to order from
    pub ca: Field<String>,
    /// Name of the DNS configuration, or `manual` / `akamai`
    pub dns: Field<String>,
    pub bundle_certs: Field<bool>,
    pub rotation: Field<RotationPolicy>,
    pub issued: IssuedCertificate,
}

impl PublicCertFields {
    /// DNS challenges handled outside the service never converge on their own
    #[must_use]
    pub fn uses_manual_dns(&self) -> bool {
        matches!(self.dns.get().map(String::as_str), Some("manual" | "akamai"))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrivateCertFields {
    pub certificate_template: Field<String>,
    pub common_name: Field<String>,
    pub alt_names: Field<Vec<String>>,
    pub ip_sans: Field<String>,
    pub uri_sans: Field<String>,
    pub other_sans: Field<Vec<String>>,
    pub ttl: Field<TtlValue>,
    pub format: Field<String>,
    pub private_key_format: Field<String>,
    pub exclude_cn_from_sans: Field<bool>,
    pub rotation: Field<RotationPolicy>,
    pub certificate_authority: Field<String>,
    pub issuing_ca: Field<String>,
    pub ca_chain: Field<Vec<String>>,
    pub issued: IssuedCertificate,
}

//! # Wire Payloads
//!
//! Superset structures for decoding secrets-manager responses. Every member is
//! optional; which ones a response actually carries depends on the kind named
//! by `secret_type` / `config_type`. Members not listed here are collected in
//! `extra` rather than dropped.

use crate::model::{CaDataWire, CryptoKeyWire, RotationPolicyWire};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

/// A TTL as the remote reports it: integer seconds or a string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TtlWire {
    Seconds(u64),
    Text(String),
}

/// Secret response body (`GET /secrets/{id}`, `POST /secrets`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretWire {
    pub secret_type: Option<String>,

    // Envelope
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub secret_group_id: Option<String>,
    pub labels: Option<Vec<String>>,
    pub custom_metadata: Option<Map<String, Value>>,
    pub version_custom_metadata: Option<Map<String, Value>>,
    pub crn: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub versions_total: Option<i64>,
    pub locks_total: Option<i64>,
    pub downloaded: Option<bool>,
    pub state: Option<i64>,
    pub state_description: Option<String>,

    // Payloads
    pub payload: Option<String>,
    pub data: Option<Map<String, Value>>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub next_rotation_date: Option<DateTime<Utc>>,
    pub rotation: Option<RotationPolicyWire>,

    // Dynamic credentials
    pub ttl: Option<TtlWire>,
    pub ttl_seconds: Option<u64>,
    pub access_groups: Option<Vec<String>>,
    pub service_id: Option<String>,
    pub service_id_is_static: Option<bool>,
    pub reuse_api_key: Option<bool>,
    pub api_key: Option<String>,
    pub api_key_id: Option<String>,
    pub account_id: Option<String>,
    pub source_service: Option<SourceServiceWire>,
    pub credentials: Option<Value>,

    // Certificates
    pub certificate: Option<String>,
    pub intermediate: Option<String>,
    pub private_key: Option<String>,
    pub common_name: Option<String>,
    pub alt_names: Option<Vec<String>>,
    pub key_algorithm: Option<String>,
    pub issuer: Option<String>,
    pub serial_number: Option<String>,
    pub intermediate_included: Option<bool>,
    pub private_key_included: Option<bool>,
    pub ca: Option<String>,
    pub dns: Option<String>,
    pub bundle_certs: Option<bool>,
    pub certificate_template: Option<String>,
    pub certificate_authority: Option<String>,
    pub ip_sans: Option<String>,
    pub uri_sans: Option<String>,
    pub other_sans: Option<Vec<String>>,
    pub format: Option<String>,
    pub private_key_format: Option<String>,
    pub exclude_cn_from_sans: Option<bool>,
    pub issuing_ca: Option<String>,
    pub ca_chain: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrnWire {
    pub crn: Option<String>,
}

/// `source_service` object of a service-credentials secret
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceServiceWire {
    pub instance: Option<CrnWire>,
    pub role: Option<CrnWire>,
    pub parameters: Option<Map<String, Value>>,
}

/// `GET /secrets/{id}/versions/{version}/metadata`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretVersionMetadataWire {
    pub id: Option<String>,
    pub version_custom_metadata: Option<Map<String, Value>>,
}

/// Configuration response body (`GET /configurations/{name}`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigurationWire {
    pub config_type: Option<String>,
    pub secret_type: Option<String>,

    pub name: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,

    pub api_key: Option<String>,

    // Certificate authorities
    pub max_ttl: Option<TtlWire>,
    pub max_ttl_seconds: Option<u64>,
    pub crl_expiry: Option<TtlWire>,
    pub crl_expiry_seconds: Option<u64>,
    pub crl_disable: Option<bool>,
    pub crl_distribution_points_encoded: Option<bool>,
    pub issuing_certificates_urls_encoded: Option<bool>,
    pub ttl: Option<TtlWire>,
    pub ttl_seconds: Option<u64>,
    pub common_name: Option<String>,
    pub alt_names: Option<Vec<String>>,
    pub ip_sans: Option<String>,
    pub uri_sans: Option<String>,
    pub other_sans: Option<Vec<String>>,
    pub format: Option<String>,
    pub private_key_format: Option<String>,
    pub key_type: Option<String>,
    pub key_bits: Option<i64>,
    pub max_path_length: Option<i64>,
    pub exclude_cn_from_sans: Option<bool>,
    pub permitted_dns_domains: Option<Vec<String>>,
    pub crypto_key: Option<CryptoKeyWire>,
    pub ou: Option<Vec<String>>,
    pub organization: Option<Vec<String>>,
    pub country: Option<Vec<String>>,
    pub locality: Option<Vec<String>>,
    pub province: Option<Vec<String>>,
    pub street_address: Option<Vec<String>>,
    pub postal_code: Option<Vec<String>>,
    pub serial_number: Option<String>,
    pub status: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub data: Option<CaDataWire>,
    pub signing_method: Option<String>,
    pub issuer: Option<String>,

    // Certificate templates
    pub certificate_authority: Option<String>,
    pub allowed_secret_groups: Option<String>,
    pub allow_localhost: Option<bool>,
    pub allowed_domains: Option<Vec<String>>,
    pub allowed_domains_template: Option<bool>,
    pub allow_bare_domains: Option<bool>,
    pub allow_subdomains: Option<bool>,
    pub allow_glob_domains: Option<bool>,
    pub allow_any_name: Option<bool>,
    pub enforce_hostnames: Option<bool>,
    pub allow_ip_sans: Option<bool>,
    pub allowed_uri_sans: Option<Vec<String>>,
    pub allowed_other_sans: Option<Vec<String>>,
    pub server_flag: Option<bool>,
    pub client_flag: Option<bool>,
    pub code_signing_flag: Option<bool>,
    pub email_protection_flag: Option<bool>,
    pub key_usage: Option<Vec<String>>,
    pub ext_key_usage: Option<Vec<String>>,
    pub ext_key_usage_oids: Option<Vec<String>>,
    pub use_csr_common_name: Option<bool>,
    pub use_csr_sans: Option<bool>,
    pub require_cn: Option<bool>,
    pub policy_identifiers: Option<Vec<String>>,
    pub basic_constraints_valid_for_non_ca: Option<bool>,
    pub not_before_duration: Option<TtlWire>,
    pub not_before_duration_seconds: Option<u64>,

    // Public certificate CA / DNS providers
    pub lets_encrypt_environment: Option<String>,
    pub lets_encrypt_private_key: Option<String>,
    pub lets_encrypt_preferred_chain: Option<String>,
    pub cloud_internet_services_apikey: Option<String>,
    pub cloud_internet_services_crn: Option<String>,
    pub classic_infrastructure_username: Option<String>,
    pub classic_infrastructure_password: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

//! # Variant Registry
//!
//! Maps the wire discriminators (`secret_type`, `config_type`) to the codec
//! and field tables of each kind. Everything that varies per kind lives here:
//! which fields a create call sends, which ones a patch may touch, whether a
//! create waits for convergence and which rotation shape the kind uses.
//!
//! The facade, the patch builder and the poller only ever consult these
//! tables, so a new kind is one enum variant, one codec and one table entry.

use crate::codec::configurations as config_codec;
use crate::codec::secrets as secret_codec;
use crate::codec::wire::{ConfigurationWire, SecretWire};
use crate::error::{Error, Result};
use crate::model::{ConfigDetails, RotationShape, SecretDetails};
use std::fmt;

/// Field that carries version-scoped metadata on every secret kind
pub const VERSION_METADATA_FIELDS: &[&str] = &["version_custom_metadata"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretKind {
    Arbitrary,
    IamCredentials,
    ImportedCert,
    Kv,
    PrivateCert,
    PublicCert,
    ServiceCredentials,
    UsernamePassword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKind {
    IamCredentials,
    PrivateCertRootCa,
    PrivateCertIntermediateCa,
    PrivateCertTemplate,
    PublicCertCaLetsEncrypt,
    PublicCertDnsCloudInternetServices,
    PublicCertDnsClassicInfrastructure,
}

type SecretDecodeFn = fn(&SecretWire, Option<&SecretDetails>) -> Result<SecretDetails>;
type ConfigDecodeFn = fn(&ConfigurationWire, Option<&ConfigDetails>) -> Result<ConfigDetails>;

/// Everything the crate knows about one secret kind
#[derive(Debug)]
pub struct SecretCodec {
    pub kind: SecretKind,
    pub tag: &'static str,
    /// Fields a create prototype may carry
    pub create_fields: &'static [&'static str],
    /// Fields the metadata patch may change
    pub mutable_fields: &'static [&'static str],
    /// Fields whose change creates a new secret version
    pub new_version_fields: &'static [&'static str],
    pub rotation: Option<RotationShape>,
    /// Whether a create waits for the secret to leave `pre_activation`
    pub converges: bool,
    pub(crate) decode: SecretDecodeFn,
}

#[derive(Debug)]
pub struct ConfigCodec {
    pub kind: ConfigKind,
    pub tag: &'static str,
    pub create_fields: &'static [&'static str],
    pub mutable_fields: &'static [&'static str],
    pub(crate) decode: ConfigDecodeFn,
}

impl SecretCodec {
    /// Every field a caller may legitimately change on an existing secret
    pub fn changeable_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.mutable_fields
            .iter()
            .chain(VERSION_METADATA_FIELDS)
            .chain(self.new_version_fields)
            .copied()
    }
}

impl SecretKind {
    pub const ALL: [SecretKind; 8] = [
        SecretKind::Arbitrary,
        SecretKind::IamCredentials,
        SecretKind::ImportedCert,
        SecretKind::Kv,
        SecretKind::PrivateCert,
        SecretKind::PublicCert,
        SecretKind::ServiceCredentials,
        SecretKind::UsernamePassword,
    ];

    #[must_use]
    pub fn codec(self) -> &'static SecretCodec {
        match self {
            SecretKind::Arbitrary => &ARBITRARY,
            SecretKind::IamCredentials => &IAM_CREDENTIALS,
            SecretKind::ImportedCert => &IMPORTED_CERT,
            SecretKind::Kv => &KV,
            SecretKind::PrivateCert => &PRIVATE_CERT,
            SecretKind::PublicCert => &PUBLIC_CERT,
            SecretKind::ServiceCredentials => &SERVICE_CREDENTIALS,
            SecretKind::UsernamePassword => &USERNAME_PASSWORD,
        }
    }

    #[must_use]
    pub fn tag(self) -> &'static str {
        self.codec().tag
    }

    pub fn from_tag(tag: &str) -> Result<Self> {
        resolve_secret(tag).map(|codec| codec.kind)
    }
}

impl ConfigKind {
    pub const ALL: [ConfigKind; 7] = [
        ConfigKind::IamCredentials,
        ConfigKind::PrivateCertRootCa,
        ConfigKind::PrivateCertIntermediateCa,
        ConfigKind::PrivateCertTemplate,
        ConfigKind::PublicCertCaLetsEncrypt,
        ConfigKind::PublicCertDnsCloudInternetServices,
        ConfigKind::PublicCertDnsClassicInfrastructure,
    ];

    #[must_use]
    pub fn codec(self) -> &'static ConfigCodec {
        match self {
            ConfigKind::IamCredentials => &IAM_CREDENTIALS_CONFIGURATION,
            ConfigKind::PrivateCertRootCa => &ROOT_CA,
            ConfigKind::PrivateCertIntermediateCa => &INTERMEDIATE_CA,
            ConfigKind::PrivateCertTemplate => &CERTIFICATE_TEMPLATE,
            ConfigKind::PublicCertCaLetsEncrypt => &LETS_ENCRYPT,
            ConfigKind::PublicCertDnsCloudInternetServices => &CLOUD_INTERNET_SERVICES,
            ConfigKind::PublicCertDnsClassicInfrastructure => &CLASSIC_INFRASTRUCTURE,
        }
    }

    #[must_use]
    pub fn tag(self) -> &'static str {
        self.codec().tag
    }

    pub fn from_tag(tag: &str) -> Result<Self> {
        resolve_config(tag).map(|codec| codec.kind)
    }
}

impl fmt::Display for SecretKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Look up the codec for a `secret_type` discriminator
pub fn resolve_secret(tag: &str) -> Result<&'static SecretCodec> {
    SecretKind::ALL
        .into_iter()
        .map(SecretKind::codec)
        .find(|codec| codec.tag == tag)
        .ok_or_else(|| Error::UnrecognizedVariant {
            family: "secret",
            tag: tag.to_string(),
        })
}

/// Look up the codec for a `config_type` discriminator
pub fn resolve_config(tag: &str) -> Result<&'static ConfigCodec> {
    ConfigKind::ALL
        .into_iter()
        .map(ConfigKind::codec)
        .find(|codec| codec.tag == tag)
        .ok_or_else(|| Error::UnrecognizedVariant {
            family: "configuration",
            tag: tag.to_string(),
        })
}

// Secret kinds

static ARBITRARY: SecretCodec = SecretCodec {
    kind: SecretKind::Arbitrary,
    tag: "arbitrary",
    create_fields: &[
        "name", "description", "secret_group_id", "labels", "custom_metadata",
        "version_custom_metadata", "payload", "expiration_date",
    ],
    mutable_fields: &["name", "description", "labels", "custom_metadata", "expiration_date"],
    new_version_fields: &["payload"],
    rotation: None,
    converges: false,
    decode: secret_codec::decode_arbitrary,
};

static IAM_CREDENTIALS: SecretCodec = SecretCodec {
    kind: SecretKind::IamCredentials,
    tag: "iam_credentials",
    create_fields: &[
        "name", "description", "secret_group_id", "labels", "custom_metadata",
        "version_custom_metadata", "ttl", "access_groups", "service_id", "reuse_api_key",
        "rotation",
    ],
    mutable_fields: &["name", "description", "labels", "custom_metadata", "ttl", "rotation"],
    new_version_fields: &[],
    rotation: Some(RotationShape::Common),
    converges: true,
    decode: secret_codec::decode_iam_credentials,
};

static IMPORTED_CERT: SecretCodec = SecretCodec {
    kind: SecretKind::ImportedCert,
    tag: "imported_cert",
    create_fields: &[
        "name", "description", "secret_group_id", "labels", "custom_metadata",
        "version_custom_metadata", "certificate", "intermediate", "private_key",
    ],
    mutable_fields: &["name", "description", "labels", "custom_metadata"],
    new_version_fields: &["certificate", "intermediate", "private_key"],
    rotation: None,
    converges: false,
    decode: secret_codec::decode_imported_cert,
};

static KV: SecretCodec = SecretCodec {
    kind: SecretKind::Kv,
    tag: "kv",
    create_fields: &[
        "name", "description", "secret_group_id", "labels", "custom_metadata",
        "version_custom_metadata", "data",
    ],
    mutable_fields: &["name", "description", "labels", "custom_metadata"],
    new_version_fields: &["data"],
    rotation: None,
    converges: false,
    decode: secret_codec::decode_kv,
};

static PRIVATE_CERT: SecretCodec = SecretCodec {
    kind: SecretKind::PrivateCert,
    tag: "private_cert",
    create_fields: &[
        "name", "description", "secret_group_id", "labels", "custom_metadata",
        "version_custom_metadata", "certificate_template", "common_name", "alt_names",
        "ip_sans", "uri_sans", "other_sans", "ttl", "format", "private_key_format",
        "exclude_cn_from_sans", "rotation",
    ],
    mutable_fields: &["name", "description", "labels", "custom_metadata", "rotation"],
    new_version_fields: &[],
    rotation: Some(RotationShape::Common),
    converges: false,
    decode: secret_codec::decode_private_cert,
};

static PUBLIC_CERT: SecretCodec = SecretCodec {
    kind: SecretKind::PublicCert,
    tag: "public_cert",
    create_fields: &[
        "name", "description", "secret_group_id", "labels", "custom_metadata",
        "version_custom_metadata", "common_name", "alt_names", "key_algorithm", "ca", "dns",
        "bundle_certs", "rotation",
    ],
    mutable_fields: &["name", "description", "labels", "custom_metadata", "rotation"],
    new_version_fields: &[],
    rotation: Some(RotationShape::Restricted),
    converges: true,
    decode: secret_codec::decode_public_cert,
};

static SERVICE_CREDENTIALS: SecretCodec = SecretCodec {
    kind: SecretKind::ServiceCredentials,
    tag: "service_credentials",
    create_fields: &[
        "name", "description", "secret_group_id", "labels", "custom_metadata",
        "version_custom_metadata", "ttl", "source_service", "rotation",
    ],
    mutable_fields: &["name", "description", "labels", "custom_metadata", "ttl", "rotation"],
    new_version_fields: &[],
    rotation: Some(RotationShape::Common),
    converges: true,
    decode: secret_codec::decode_service_credentials,
};

static USERNAME_PASSWORD: SecretCodec = SecretCodec {
    kind: SecretKind::UsernamePassword,
    tag: "username_password",
    create_fields: &[
        "name", "description", "secret_group_id", "labels", "custom_metadata",
        "version_custom_metadata", "username", "password", "expiration_date", "rotation",
    ],
    mutable_fields: &[
        "name", "description", "labels", "custom_metadata", "expiration_date", "rotation",
    ],
    new_version_fields: &["password"],
    rotation: Some(RotationShape::Common),
    converges: false,
    decode: secret_codec::decode_username_password,
};

// Configuration kinds

const CA_MUTABLE_FIELDS: &[&str] = &[
    "max_ttl",
    "crl_expiry",
    "crl_disable",
    "crl_distribution_points_encoded",
    "issuing_certificates_urls_encoded",
];

static IAM_CREDENTIALS_CONFIGURATION: ConfigCodec = ConfigCodec {
    kind: ConfigKind::IamCredentials,
    tag: "iam_credentials_configuration",
    create_fields: &["name", "api_key"],
    mutable_fields: &["api_key"],
    decode: config_codec::decode_iam_credentials,
};

static ROOT_CA: ConfigCodec = ConfigCodec {
    kind: ConfigKind::PrivateCertRootCa,
    tag: "private_cert_configuration_root_ca",
    create_fields: &[
        "name", "max_ttl", "crl_expiry", "crl_disable", "crl_distribution_points_encoded",
        "issuing_certificates_urls_encoded", "common_name", "alt_names", "ip_sans", "uri_sans",
        "other_sans", "ttl", "format", "private_key_format", "key_type", "key_bits",
        "max_path_length", "exclude_cn_from_sans", "permitted_dns_domains", "ou",
        "organization", "country", "locality", "province", "street_address", "postal_code",
        "serial_number", "crypto_key",
    ],
    mutable_fields: CA_MUTABLE_FIELDS,
    decode: config_codec::decode_root_ca,
};

static INTERMEDIATE_CA: ConfigCodec = ConfigCodec {
    kind: ConfigKind::PrivateCertIntermediateCa,
    tag: "private_cert_configuration_intermediate_ca",
    create_fields: &[
        "name", "max_ttl", "crl_expiry", "crl_disable", "crl_distribution_points_encoded",
        "issuing_certificates_urls_encoded", "common_name", "alt_names", "ip_sans", "uri_sans",
        "other_sans", "format", "private_key_format", "key_type", "key_bits",
        "max_path_length", "exclude_cn_from_sans", "permitted_dns_domains", "ou",
        "organization", "country", "locality", "province", "street_address", "postal_code",
        "serial_number", "signing_method", "issuer", "crypto_key",
    ],
    mutable_fields: CA_MUTABLE_FIELDS,
    decode: config_codec::decode_intermediate_ca,
};

static CERTIFICATE_TEMPLATE: ConfigCodec = ConfigCodec {
    kind: ConfigKind::PrivateCertTemplate,
    tag: "private_cert_configuration_template",
    create_fields: &[
        "name", "certificate_authority", "allowed_secret_groups", "max_ttl", "ttl",
        "allow_localhost", "allowed_domains", "allowed_domains_template", "allow_bare_domains",
        "allow_subdomains", "allow_glob_domains", "allow_any_name", "enforce_hostnames",
        "allow_ip_sans", "allowed_uri_sans", "allowed_other_sans", "server_flag",
        "client_flag", "code_signing_flag", "email_protection_flag", "key_type", "key_bits",
        "key_usage", "ext_key_usage", "ext_key_usage_oids", "use_csr_common_name",
        "use_csr_sans", "ou", "organization", "country", "locality", "province",
        "street_address", "postal_code", "serial_number", "require_cn", "policy_identifiers",
        "basic_constraints_valid_for_non_ca", "not_before_duration",
    ],
    mutable_fields: &[
        "allowed_secret_groups", "max_ttl", "ttl", "allow_localhost", "allowed_domains",
        "allowed_domains_template", "allow_bare_domains", "allow_subdomains",
        "allow_glob_domains", "allow_any_name", "enforce_hostnames", "allow_ip_sans",
        "allowed_uri_sans", "allowed_other_sans", "server_flag", "client_flag",
        "code_signing_flag", "email_protection_flag", "key_type", "key_bits", "key_usage",
        "ext_key_usage", "ext_key_usage_oids", "use_csr_common_name", "use_csr_sans", "ou",
        "organization", "country", "locality", "province", "street_address", "postal_code",
        "require_cn", "policy_identifiers", "basic_constraints_valid_for_non_ca",
        "not_before_duration",
    ],
    decode: config_codec::decode_certificate_template,
};

static LETS_ENCRYPT: ConfigCodec = ConfigCodec {
    kind: ConfigKind::PublicCertCaLetsEncrypt,
    tag: "public_cert_configuration_ca_lets_encrypt",
    create_fields: &[
        "name",
        "lets_encrypt_environment",
        "lets_encrypt_private_key",
        "lets_encrypt_preferred_chain",
    ],
    mutable_fields: &[
        "lets_encrypt_environment",
        "lets_encrypt_private_key",
        "lets_encrypt_preferred_chain",
    ],
    decode: config_codec::decode_lets_encrypt,
};

static CLOUD_INTERNET_SERVICES: ConfigCodec = ConfigCodec {
    kind: ConfigKind::PublicCertDnsCloudInternetServices,
    tag: "public_cert_configuration_dns_cloud_internet_services",
    create_fields: &[
        "name",
        "cloud_internet_services_apikey",
        "cloud_internet_services_crn",
    ],
    mutable_fields: &["cloud_internet_services_apikey", "cloud_internet_services_crn"],
    decode: config_codec::decode_cloud_internet_services,
};

static CLASSIC_INFRASTRUCTURE: ConfigCodec = ConfigCodec {
    kind: ConfigKind::PublicCertDnsClassicInfrastructure,
    tag: "public_cert_configuration_dns_classic_infrastructure",
    create_fields: &[
        "name",
        "classic_infrastructure_username",
        "classic_infrastructure_password",
    ],
    mutable_fields: &[
        "classic_infrastructure_username",
        "classic_infrastructure_password",
    ],
    decode: config_codec::decode_classic_infrastructure,
};

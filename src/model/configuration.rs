//! Configuration attributes: certificate authorities, certificate templates,
//! DNS providers and IAM credential settings. Configurations are keyed by
//! name and have no lifecycle state.

use crate::model::{CaData, CryptoKey, Field, ResourceEnvelope, Sensitive, TtlValue};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationAttributes {
    pub envelope: ResourceEnvelope,
    pub details: ConfigDetails,
    pub extra: Map<String, Value>,
}

impl ConfigurationAttributes {
    #[must_use]
    pub fn new(name: impl Into<String>, details: ConfigDetails) -> Self {
        Self {
            envelope: ResourceEnvelope::named(name),
            details,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> crate::registry::ConfigKind {
        self.details.kind()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.envelope.name.get().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigDetails {
    IamCredentials(IamCredentialsConfigFields),
    PrivateCertRootCa(CertificateAuthorityFields),
    PrivateCertIntermediateCa(IntermediateCaFields),
    PrivateCertTemplate(CertificateTemplateFields),
    PublicCertCaLetsEncrypt(LetsEncryptFields),
    PublicCertDnsCloudInternetServices(CloudInternetServicesFields),
    PublicCertDnsClassicInfrastructure(ClassicInfrastructureFields),
}

impl ConfigDetails {
    #[must_use]
    pub fn kind(&self) -> crate::registry::ConfigKind {
        use crate::registry::ConfigKind;
        match self {
            ConfigDetails::IamCredentials(_) => ConfigKind::IamCredentials,
            ConfigDetails::PrivateCertRootCa(_) => ConfigKind::PrivateCertRootCa,
            ConfigDetails::PrivateCertIntermediateCa(_) => ConfigKind::PrivateCertIntermediateCa,
            ConfigDetails::PrivateCertTemplate(_) => ConfigKind::PrivateCertTemplate,
            ConfigDetails::PublicCertCaLetsEncrypt(_) => ConfigKind::PublicCertCaLetsEncrypt,
            ConfigDetails::PublicCertDnsCloudInternetServices(_) => {
                ConfigKind::PublicCertDnsCloudInternetServices
            }
            ConfigDetails::PublicCertDnsClassicInfrastructure(_) => {
                ConfigKind::PublicCertDnsClassicInfrastructure
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IamCredentialsConfigFields {
    pub api_key: Field<Sensitive>,
}

/// X.509 subject name components
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DistinguishedName {
    pub ou: Field<Vec<String>>,
    pub organization: Field<Vec<String>>,
    pub country: Field<Vec<String>>,
    pub locality: Field<Vec<String>>,
    pub province: Field<Vec<String>>,
    pub street_address: Field<Vec<String>>,
    pub postal_code: Field<Vec<String>>,
}

/// Subject of a CA certificate
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaSubject {
    pub common_name: Field<String>,
    pub alt_names: Field<Vec<String>>,
    pub ip_sans: Field<String>,
    pub uri_sans: Field<String>,
    pub other_sans: Field<Vec<String>>,
    pub serial_number: Field<String>,
    pub names: DistinguishedName,
}

/// Root or intermediate certificate authority
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CertificateAuthorityFields {
    pub max_ttl: Field<TtlValue>,
    pub crl_expiry: Field<TtlValue>,
    pub crl_disable: Field<bool>,
    pub crl_distribution_points_encoded: Field<bool>,
    pub issuing_certificates_urls_encoded: Field<bool>,
    pub ttl: Field<TtlValue>,
    pub subject: CaSubject,
    pub format: Field<String>,
    pub private_key_format: Field<String>,
    pub key_type: Field<String>,
    pub key_bits: Field<i64>,
    pub max_path_length: Field<i64>,
    pub exclude_cn_from_sans: Field<bool>,
    pub permitted_dns_domains: Field<Vec<String>>,
    /// Externally held signing key; fixed once the CA exists
    pub crypto_key: Field<CryptoKey>,
    /// e.g. `configured`, `signing_required`, `signing_pending`, `expired`
    pub status: Field<String>,
    pub expiration_date: Field<DateTime<Utc>>,
    pub data: Field<CaData>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntermediateCaFields {
    pub ca: CertificateAuthorityFields,
    /// `internal` (signed by `issuer` on create) or `external`
    pub signing_method: Field<String>,
    pub issuer: Field<String>,
}

impl IntermediateCaFields {
    #[must_use]
    pub fn signs_internally(&self) -> bool {
        self.signing_method.get().map(String::as_str) == Some("internal")
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CertificateTemplateFields {
    /// Issuing CA; fixed once the template exists
    pub certificate_authority: Field<String>,
    pub allowed_secret_groups: Field<String>,
    pub max_ttl: Field<TtlValue>,
    pub ttl: Field<TtlValue>,
    pub allow_localhost: Field<bool>,
    pub allowed_domains: Field<Vec<String>>,
    pub allowed_domains_template: Field<bool>,
    pub allow_bare_domains: Field<bool>,
    pub allow_subdomains: Field<bool>,
    pub allow_glob_domains: Field<bool>,
    pub allow_any_name: Field<bool>,
    pub enforce_hostnames: Field<bool>,
    pub allow_ip_sans: Field<bool>,
    pub allowed_uri_sans: Field<Vec<String>>,
    pub allowed_other_sans: Field<Vec<String>>,
    pub server_flag: Field<bool>,
    pub client_flag: Field<bool>,
    pub code_signing_flag: Field<bool>,
    pub email_protection_flag: Field<bool>,
    pub key_type: Field<String>,
    pub key_bits: Field<i64>,
    pub key_usage: Field<Vec<String>>,
    pub ext_key_usage: Field<Vec<String>>,
    pub ext_key_usage_oids: Field<Vec<String>>,
    pub use_csr_common_name: Field<bool>,
    pub use_csr_sans: Field<bool>,
    pub names: DistinguishedName,
    pub serial_number: Field<String>,
    pub require_cn: Field<bool>,
    pub policy_identifiers: Field<Vec<String>>,
    pub basic_constraints_valid_for_non_ca: Field<bool>,
    pub not_before_duration: Field<TtlValue>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LetsEncryptFields {
    /// `production` or `staging`
    pub lets_encrypt_environment: Field<String>,
    pub lets_encrypt_private_key: Field<Sensitive>,
    pub lets_encrypt_preferred_chain: Field<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CloudInternetServicesFields {
    pub cloud_internet_services_apikey: Field<Sensitive>,
    pub cloud_internet_services_crn: Field<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassicInfrastructureFields {
    pub classic_infrastructure_username: Field<String>,
    pub classic_infrastructure_password: Field<Sensitive>,
}

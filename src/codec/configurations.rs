//! Per-kind configuration codecs.
//!
//! CA configurations report durations as `<field>_seconds`; the configured
//! spelling comes from the prior local state (see [`TtlValue::reconcile`]).
//!
//! [`TtlValue::reconcile`]: crate::model::TtlValue::reconcile

use super::wire::ConfigurationWire;
use super::{carried, carried_sensitive, decode_ttl, FieldSet};
use crate::constants::SIGN_INTERMEDIATE_ACTION;
use crate::error::Result;
use crate::model::{
    CaData, CaDataShape, CaSubject, CertificateAuthorityFields, CertificateTemplateFields,
    ClassicInfrastructureFields, CloudInternetServicesFields, ConfigDetails, CryptoKey,
    DistinguishedName, Field, IamCredentialsConfigFields, IntermediateCaFields,
    LetsEncryptFields, ResourceEnvelope,
};
use serde_json::{Map, Value};

pub(crate) fn decode_envelope(wire: &ConfigurationWire) -> ResourceEnvelope {
    ResourceEnvelope {
        name: wire.name.clone().into(),
        created_by: wire.created_by.clone().into(),
        created_at: wire.created_at.into(),
        updated_at: wire.updated_at.into(),
        ..ResourceEnvelope::default()
    }
}

fn decode_names(wire: &ConfigurationWire, prior: &DistinguishedName) -> DistinguishedName {
    DistinguishedName {
        ou: carried(wire.ou.as_ref(), &prior.ou),
        organization: carried(wire.organization.as_ref(), &prior.organization),
        country: carried(wire.country.as_ref(), &prior.country),
        locality: carried(wire.locality.as_ref(), &prior.locality),
        province: carried(wire.province.as_ref(), &prior.province),
        street_address: carried(wire.street_address.as_ref(), &prior.street_address),
        postal_code: carried(wire.postal_code.as_ref(), &prior.postal_code),
    }
}

fn decode_subject(wire: &ConfigurationWire, prior: &CaSubject) -> CaSubject {
    CaSubject {
        common_name: carried(wire.common_name.as_ref(), &prior.common_name),
        alt_names: carried(wire.alt_names.as_ref(), &prior.alt_names),
        ip_sans: carried(wire.ip_sans.as_ref(), &prior.ip_sans),
        uri_sans: carried(wire.uri_sans.as_ref(), &prior.uri_sans),
        other_sans: carried(wire.other_sans.as_ref(), &prior.other_sans),
        serial_number: carried(wire.serial_number.as_ref(), &prior.serial_number),
        names: decode_names(wire, &prior.names),
    }
}

fn decode_authority(
    kind: &'static str,
    wire: &ConfigurationWire,
    prior: &CertificateAuthorityFields,
    shape: CaDataShape,
) -> Result<CertificateAuthorityFields> {
    Ok(CertificateAuthorityFields {
        max_ttl: decode_ttl(
            kind,
            "max_ttl",
            wire.max_ttl_seconds,
            wire.max_ttl.as_ref(),
            &prior.max_ttl,
        )?,
        crl_expiry: decode_ttl(
            kind,
            "crl_expiry",
            wire.crl_expiry_seconds,
            wire.crl_expiry.as_ref(),
            &prior.crl_expiry,
        )?,
        crl_disable: wire.crl_disable.into(),
        crl_distribution_points_encoded: wire.crl_distribution_points_encoded.into(),
        issuing_certificates_urls_encoded: wire.issuing_certificates_urls_encoded.into(),
        ttl: decode_ttl(kind, "ttl", wire.ttl_seconds, wire.ttl.as_ref(), &prior.ttl)?,
        subject: decode_subject(wire, &prior.subject),
        format: carried(wire.format.as_ref(), &prior.format),
        private_key_format: carried(wire.private_key_format.as_ref(), &prior.private_key_format),
        key_type: carried(wire.key_type.as_ref(), &prior.key_type),
        key_bits: carried(wire.key_bits.as_ref(), &prior.key_bits),
        max_path_length: carried(wire.max_path_length.as_ref(), &prior.max_path_length),
        exclude_cn_from_sans: carried(
            wire.exclude_cn_from_sans.as_ref(),
            &prior.exclude_cn_from_sans,
        ),
        permitted_dns_domains: carried(
            wire.permitted_dns_domains.as_ref(),
            &prior.permitted_dns_domains,
        ),
        crypto_key: match &wire.crypto_key {
            Some(key) => Field::Set(CryptoKey::decode(kind, key)?),
            None => prior.crypto_key.clone(),
        },
        status: wire.status.clone().into(),
        expiration_date: wire.expiration_date.into(),
        data: wire
            .data
            .as_ref()
            .map(|data| CaData::decode(shape, data))
            .into(),
    })
}

pub(crate) fn decode_iam_credentials(
    wire: &ConfigurationWire,
    prior: Option<&ConfigDetails>,
) -> Result<ConfigDetails> {
    let prior = match prior {
        Some(ConfigDetails::IamCredentials(p)) => p.clone(),
        _ => IamCredentialsConfigFields::default(),
    };
    Ok(ConfigDetails::IamCredentials(IamCredentialsConfigFields {
        api_key: carried_sensitive(wire.api_key.as_ref(), &prior.api_key),
    }))
}

pub(crate) fn decode_root_ca(
    wire: &ConfigurationWire,
    prior: Option<&ConfigDetails>,
) -> Result<ConfigDetails> {
    let prior = match prior {
        Some(ConfigDetails::PrivateCertRootCa(p)) => p.clone(),
        _ => CertificateAuthorityFields::default(),
    };
    let fields = decode_authority(
        "private_cert_configuration_root_ca",
        wire,
        &prior,
        CaDataShape::Signed,
    )?;
    Ok(ConfigDetails::PrivateCertRootCa(fields))
}

pub(crate) fn decode_intermediate_ca(
    wire: &ConfigurationWire,
    prior: Option<&ConfigDetails>,
) -> Result<ConfigDetails> {
    let prior = match prior {
        Some(ConfigDetails::PrivateCertIntermediateCa(p)) => p.clone(),
        _ => IntermediateCaFields::default(),
    };
    let shape = CaDataShape::for_intermediate_status(wire.status.as_deref());
    Ok(ConfigDetails::PrivateCertIntermediateCa(IntermediateCaFields {
        ca: decode_authority(
            "private_cert_configuration_intermediate_ca",
            wire,
            &prior.ca,
            shape,
        )?,
        signing_method: carried(wire.signing_method.as_ref(), &prior.signing_method),
        issuer: carried(wire.issuer.as_ref(), &prior.issuer),
    }))
}

pub(crate) fn decode_certificate_template(
    wire: &ConfigurationWire,
    prior: Option<&ConfigDetails>,
) -> Result<ConfigDetails> {
    const KIND: &str = "private_cert_configuration_template";
    let prior = match prior {
        Some(ConfigDetails::PrivateCertTemplate(p)) => p.clone(),
        _ => CertificateTemplateFields::default(),
    };
    Ok(ConfigDetails::PrivateCertTemplate(CertificateTemplateFields {
        certificate_authority: wire.certificate_authority.clone().into(),
        allowed_secret_groups: wire.allowed_secret_groups.clone().into(),
        max_ttl: decode_ttl(
            KIND,
            "max_ttl",
            wire.max_ttl_seconds,
            wire.max_ttl.as_ref(),
            &prior.max_ttl,
        )?,
        ttl: decode_ttl(KIND, "ttl", wire.ttl_seconds, wire.ttl.as_ref(), &prior.ttl)?,
        allow_localhost: wire.allow_localhost.into(),
        allowed_domains: wire.allowed_domains.clone().into(),
        allowed_domains_template: wire.allowed_domains_template.into(),
        allow_bare_domains: wire.allow_bare_domains.into(),
        allow_subdomains: wire.allow_subdomains.into(),
        allow_glob_domains: wire.allow_glob_domains.into(),
        allow_any_name: wire.allow_any_name.into(),
        enforce_hostnames: wire.enforce_hostnames.into(),
        allow_ip_sans: wire.allow_ip_sans.into(),
        allowed_uri_sans: wire.allowed_uri_sans.clone().into(),
        allowed_other_sans: wire.allowed_other_sans.clone().into(),
        server_flag: wire.server_flag.into(),
        client_flag: wire.client_flag.into(),
        code_signing_flag: wire.code_signing_flag.into(),
        email_protection_flag: wire.email_protection_flag.into(),
        key_type: wire.key_type.clone().into(),
        key_bits: wire.key_bits.into(),
        key_usage: wire.key_usage.clone().into(),
        ext_key_usage: wire.ext_key_usage.clone().into(),
        ext_key_usage_oids: wire.ext_key_usage_oids.clone().into(),
        use_csr_common_name: wire.use_csr_common_name.into(),
        use_csr_sans: wire.use_csr_sans.into(),
        names: decode_names(wire, &prior.names),
        serial_number: carried(wire.serial_number.as_ref(), &prior.serial_number),
        require_cn: wire.require_cn.into(),
        policy_identifiers: wire.policy_identifiers.clone().into(),
        basic_constraints_valid_for_non_ca: wire.basic_constraints_valid_for_non_ca.into(),
        not_before_duration: decode_ttl(
            KIND,
            "not_before_duration",
            wire.not_before_duration_seconds,
            wire.not_before_duration.as_ref(),
            &prior.not_before_duration,
        )?,
    }))
}

pub(crate) fn decode_lets_encrypt(
    wire: &ConfigurationWire,
    prior: Option<&ConfigDetails>,
) -> Result<ConfigDetails> {
    let prior = match prior {
        Some(ConfigDetails::PublicCertCaLetsEncrypt(p)) => p.clone(),
        _ => LetsEncryptFields::default(),
    };
    Ok(ConfigDetails::PublicCertCaLetsEncrypt(LetsEncryptFields {
        lets_encrypt_environment: wire.lets_encrypt_environment.clone().into(),
        lets_encrypt_private_key: carried_sensitive(
            wire.lets_encrypt_private_key.as_ref(),
            &prior.lets_encrypt_private_key,
        ),
        lets_encrypt_preferred_chain: carried(
            wire.lets_encrypt_preferred_chain.as_ref(),
            &prior.lets_encrypt_preferred_chain,
        ),
    }))
}

pub(crate) fn decode_cloud_internet_services(
    wire: &ConfigurationWire,
    prior: Option<&ConfigDetails>,
) -> Result<ConfigDetails> {
    let prior = match prior {
        Some(ConfigDetails::PublicCertDnsCloudInternetServices(p)) => p.clone(),
        _ => CloudInternetServicesFields::default(),
    };
    Ok(ConfigDetails::PublicCertDnsCloudInternetServices(
        CloudInternetServicesFields {
            cloud_internet_services_apikey: carried_sensitive(
                wire.cloud_internet_services_apikey.as_ref(),
                &prior.cloud_internet_services_apikey,
            ),
            cloud_internet_services_crn: wire.cloud_internet_services_crn.clone().into(),
        },
    ))
}

pub(crate) fn decode_classic_infrastructure(
    wire: &ConfigurationWire,
    prior: Option<&ConfigDetails>,
) -> Result<ConfigDetails> {
    let prior = match prior {
        Some(ConfigDetails::PublicCertDnsClassicInfrastructure(p)) => p.clone(),
        _ => ClassicInfrastructureFields::default(),
    };
    Ok(ConfigDetails::PublicCertDnsClassicInfrastructure(
        ClassicInfrastructureFields {
            classic_infrastructure_username: wire.classic_infrastructure_username.clone().into(),
            classic_infrastructure_password: carried_sensitive(
                wire.classic_infrastructure_password.as_ref(),
                &prior.classic_infrastructure_password,
            ),
        },
    ))
}

fn collect_names(names: &DistinguishedName, out: &mut FieldSet) {
    out.put("ou", &names.ou);
    out.put("organization", &names.organization);
    out.put("country", &names.country);
    out.put("locality", &names.locality);
    out.put("province", &names.province);
    out.put("street_address", &names.street_address);
    out.put("postal_code", &names.postal_code);
}

/// Subject members, also used to build the internal signing request
pub(crate) fn collect_subject(subject: &CaSubject, out: &mut FieldSet) {
    out.put("common_name", &subject.common_name);
    out.put("alt_names", &subject.alt_names);
    out.put("ip_sans", &subject.ip_sans);
    out.put("uri_sans", &subject.uri_sans);
    out.put("other_sans", &subject.other_sans);
    out.put("serial_number", &subject.serial_number);
    collect_names(&subject.names, out);
}

fn collect_authority(ca: &CertificateAuthorityFields, out: &mut FieldSet) {
    out.put("max_ttl", &ca.max_ttl);
    out.put("crl_expiry", &ca.crl_expiry);
    out.put("crl_disable", &ca.crl_disable);
    out.put(
        "crl_distribution_points_encoded",
        &ca.crl_distribution_points_encoded,
    );
    out.put(
        "issuing_certificates_urls_encoded",
        &ca.issuing_certificates_urls_encoded,
    );
    out.put("ttl", &ca.ttl);
    collect_subject(&ca.subject, out);
    out.put("format", &ca.format);
    out.put("private_key_format", &ca.private_key_format);
    out.put("key_type", &ca.key_type);
    out.put("key_bits", &ca.key_bits);
    out.put("max_path_length", &ca.max_path_length);
    out.put("exclude_cn_from_sans", &ca.exclude_cn_from_sans);
    out.put("permitted_dns_domains", &ca.permitted_dns_domains);
    out.put("crypto_key", &ca.crypto_key);
    out.put("status", &ca.status);
    out.put("expiration_date", &ca.expiration_date);
}

pub(crate) fn collect(details: &ConfigDetails, out: &mut FieldSet) {
    match details {
        ConfigDetails::IamCredentials(f) => out.put("api_key", &f.api_key),
        ConfigDetails::PrivateCertRootCa(f) => collect_authority(f, out),
        ConfigDetails::PrivateCertIntermediateCa(f) => {
            collect_authority(&f.ca, out);
            out.put("signing_method", &f.signing_method);
            out.put("issuer", &f.issuer);
        }
        ConfigDetails::PrivateCertTemplate(f) => {
            out.put("certificate_authority", &f.certificate_authority);
            out.put("allowed_secret_groups", &f.allowed_secret_groups);
            out.put("max_ttl", &f.max_ttl);
            out.put("ttl", &f.ttl);
            out.put("allow_localhost", &f.allow_localhost);
            out.put("allowed_domains", &f.allowed_domains);
            out.put("allowed_domains_template", &f.allowed_domains_template);
            out.put("allow_bare_domains", &f.allow_bare_domains);
            out.put("allow_subdomains", &f.allow_subdomains);
            out.put("allow_glob_domains", &f.allow_glob_domains);
            out.put("allow_any_name", &f.allow_any_name);
            out.put("enforce_hostnames", &f.enforce_hostnames);
            out.put("allow_ip_sans", &f.allow_ip_sans);
            out.put("allowed_uri_sans", &f.allowed_uri_sans);
            out.put("allowed_other_sans", &f.allowed_other_sans);
            out.put("server_flag", &f.server_flag);
            out.put("client_flag", &f.client_flag);
            out.put("code_signing_flag", &f.code_signing_flag);
            out.put("email_protection_flag", &f.email_protection_flag);
            out.put("key_type", &f.key_type);
            out.put("key_bits", &f.key_bits);
            out.put("key_usage", &f.key_usage);
            out.put("ext_key_usage", &f.ext_key_usage);
            out.put("ext_key_usage_oids", &f.ext_key_usage_oids);
            out.put("use_csr_common_name", &f.use_csr_common_name);
            out.put("use_csr_sans", &f.use_csr_sans);
            collect_names(&f.names, out);
            out.put("serial_number", &f.serial_number);
            out.put("require_cn", &f.require_cn);
            out.put("policy_identifiers", &f.policy_identifiers);
            out.put(
                "basic_constraints_valid_for_non_ca",
                &f.basic_constraints_valid_for_non_ca,
            );
            out.put("not_before_duration", &f.not_before_duration);
        }
        ConfigDetails::PublicCertCaLetsEncrypt(f) => {
            out.put("lets_encrypt_environment", &f.lets_encrypt_environment);
            out.put("lets_encrypt_private_key", &f.lets_encrypt_private_key);
            out.put("lets_encrypt_preferred_chain", &f.lets_encrypt_preferred_chain);
        }
        ConfigDetails::PublicCertDnsCloudInternetServices(f) => {
            out.put(
                "cloud_internet_services_apikey",
                &f.cloud_internet_services_apikey,
            );
            out.put("cloud_internet_services_crn", &f.cloud_internet_services_crn);
        }
        ConfigDetails::PublicCertDnsClassicInfrastructure(f) => {
            out.put(
                "classic_infrastructure_username",
                &f.classic_infrastructure_username,
            );
            out.put(
                "classic_infrastructure_password",
                &f.classic_infrastructure_password,
            );
        }
    }
}

/// Body of the action asking `issuer` to sign an intermediate CA's CSR
pub(crate) fn sign_intermediate_action(name: &str, intermediate: &IntermediateCaFields) -> Map<String, Value> {
    let ca = &intermediate.ca;
    let mut out = FieldSet::default();
    collect_subject(&ca.subject, &mut out);
    out.put("ttl", &ca.ttl);
    out.put("format", &ca.format);
    out.put("max_path_length", &ca.max_path_length);
    out.put("exclude_cn_from_sans", &ca.exclude_cn_from_sans);
    out.put("permitted_dns_domains", &ca.permitted_dns_domains);

    let names: Vec<&'static str> = out.names().filter(|n| *n != "serial_number").collect();
    let mut body = out.project(&names);
    body.insert(
        "action_type".into(),
        Value::String(SIGN_INTERMEDIATE_ACTION.to_string()),
    );
    body.insert(
        "intermediate_certificate_authority".into(),
        Value::String(name.to_string()),
    );
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_configuration, encode_configuration};
    use crate::error::Error;
    use crate::model::{ConfigurationAttributes, TtlValue};
    use serde_json::json;

    fn root_ca() -> ConfigurationAttributes {
        ConfigurationAttributes::new(
            "root",
            ConfigDetails::PrivateCertRootCa(CertificateAuthorityFields {
                max_ttl: Field::Set(TtlValue::parse("8760h").unwrap()),
                subject: CaSubject {
                    common_name: Field::Set("example.com".into()),
                    ..Default::default()
                },
                ..Default::default()
            }),
        )
    }

    #[test]
    fn test_root_ca_prototype() {
        let body = encode_configuration(&root_ca()).unwrap();
        assert_eq!(
            body,
            json!({
                "config_type": "private_cert_configuration_root_ca",
                "name": "root",
                "max_ttl": "8760h",
                "common_name": "example.com"
            })
        );
    }

    #[test]
    fn test_max_ttl_spelling_survives_read() {
        let prior = root_ca();
        let wire = json!({
            "config_type": "private_cert_configuration_root_ca",
            "name": "root",
            "max_ttl_seconds": 31_536_000,
            "common_name": "example.com",
            "status": "configured",
            "data": {"certificate": "-----BEGIN CERTIFICATE-----", "expiration": 1_700_000_000}
        });
        let decoded = decode_configuration(wire, None, Some(&prior)).unwrap();
        let ConfigDetails::PrivateCertRootCa(fields) = decoded.details else {
            panic!("expected root CA");
        };
        assert_eq!(fields.max_ttl.get().unwrap().configured(), Some("8760h"));
        assert_eq!(
            fields.data.get().map(CaData::shape),
            Some(CaDataShape::Signed)
        );
    }

    #[test]
    fn test_intermediate_pending_signature_decodes_csr() {
        let wire = json!({
            "config_type": "private_cert_configuration_intermediate_ca",
            "name": "intermediate",
            "status": "signing_required",
            "signing_method": "external",
            "data": {"csr": "-----BEGIN CERTIFICATE REQUEST-----", "private_key_type": "rsa"}
        });
        let decoded = decode_configuration(wire, None, None).unwrap();
        let ConfigDetails::PrivateCertIntermediateCa(fields) = decoded.details else {
            panic!("expected intermediate CA");
        };
        let data = fields.ca.data.get().unwrap();
        assert_eq!(data.shape(), CaDataShape::PendingCsr);
        assert_eq!(data.csr(), Some("-----BEGIN CERTIFICATE REQUEST-----"));
    }

    #[test]
    fn test_configuration_without_name_cannot_be_encoded() {
        let mut desired = root_ca();
        desired.envelope.name = Field::Absent;
        let err = encode_configuration(&desired).unwrap_err();
        assert!(matches!(err, Error::Codec { field: "name", .. }));
    }

    #[test]
    fn test_kind_mismatch_is_reported() {
        let wire = json!({"config_type": "private_cert_configuration_template", "name": "t"});
        let err = decode_configuration(
            wire,
            Some(crate::registry::ConfigKind::PrivateCertRootCa),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::KindMismatch { .. }));
    }
}

//! Per-kind secret codecs.

use super::wire::{SecretWire, SourceServiceWire};
use super::{carried, carried_sensitive, decode_ttl, FieldSet};
use crate::error::Result;
use crate::model::{
    metadata_from_wire, ArbitraryFields, Field, IamCredentialsFields, ImportedCertFields,
    IssuedCertificate, KvFields, LifecycleStatus, PrivateCertFields, PublicCertFields,
    ResourceEnvelope, RotationPolicy, RotationShape, SecretDetails, ServiceCredentialsFields,
    SourceService, UsernamePasswordFields,
};
use serde_json::{Map, Value};

pub(crate) fn decode_envelope(kind: &'static str, wire: &SecretWire) -> Result<ResourceEnvelope> {
    Ok(ResourceEnvelope {
        id: wire.id.clone().into(),
        name: wire.name.clone().into(),
        description: wire.description.clone().into(),
        secret_group_id: wire.secret_group_id.clone().into(),
        labels: wire.labels.clone().into(),
        custom_metadata: wire.custom_metadata.as_ref().map(metadata_from_wire).into(),
        crn: wire.crn.clone().into(),
        created_by: wire.created_by.clone().into(),
        created_at: wire.created_at.into(),
        updated_at: wire.updated_at.into(),
        versions_total: wire.versions_total.into(),
        locks_total: wire.locks_total.into(),
        downloaded: wire.downloaded.into(),
        lifecycle: LifecycleStatus::from_wire(
            kind,
            wire.state,
            wire.state_description.as_deref(),
        )?,
    })
}

fn decode_rotation(
    kind: &'static str,
    shape: RotationShape,
    wire: &SecretWire,
) -> Result<Field<RotationPolicy>> {
    Ok(wire
        .rotation
        .as_ref()
        .map(|rotation| RotationPolicy::decode(kind, shape, rotation))
        .transpose()?
        .into())
}

fn decode_issued(wire: &SecretWire, prior: &IssuedCertificate) -> IssuedCertificate {
    IssuedCertificate {
        certificate: wire.certificate.clone().into(),
        intermediate: wire.intermediate.clone().into(),
        private_key: carried_sensitive(wire.private_key.as_ref(), &prior.private_key),
        issuer: wire.issuer.clone().into(),
        serial_number: wire.serial_number.clone().into(),
        expiration_date: wire.expiration_date.into(),
    }
}

fn decode_source_service(wire: &SourceServiceWire) -> SourceService {
    SourceService {
        instance_crn: wire.instance.as_ref().and_then(|i| i.crn.clone()).into(),
        role_crn: wire.role.as_ref().and_then(|r| r.crn.clone()).into(),
        parameters: wire.parameters.clone().into(),
    }
}

pub(crate) fn decode_arbitrary(
    wire: &SecretWire,
    prior: Option<&SecretDetails>,
) -> Result<SecretDetails> {
    let prior = match prior {
        Some(SecretDetails::Arbitrary(p)) => p.clone(),
        _ => ArbitraryFields::default(),
    };
    Ok(SecretDetails::Arbitrary(ArbitraryFields {
        payload: carried_sensitive(wire.payload.as_ref(), &prior.payload),
        expiration_date: wire.expiration_date.into(),
    }))
}

pub(crate) fn decode_kv(wire: &SecretWire, prior: Option<&SecretDetails>) -> Result<SecretDetails> {
    let prior = match prior {
        Some(SecretDetails::Kv(p)) => p.clone(),
        _ => KvFields::default(),
    };
    Ok(SecretDetails::Kv(KvFields {
        data: carried(wire.data.as_ref(), &prior.data),
    }))
}

pub(crate) fn decode_username_password(
    wire: &SecretWire,
    prior: Option<&SecretDetails>,
) -> Result<SecretDetails> {
    let prior = match prior {
        Some(SecretDetails::UsernamePassword(p)) => p.clone(),
        _ => UsernamePasswordFields::default(),
    };
    Ok(SecretDetails::UsernamePassword(UsernamePasswordFields {
        username: wire.username.clone().into(),
        password: carried_sensitive(wire.password.as_ref(), &prior.password),
        expiration_date: wire.expiration_date.into(),
        rotation: decode_rotation("username_password", RotationShape::Common, wire)?,
        next_rotation_date: wire.next_rotation_date.into(),
    }))
}

pub(crate) fn decode_iam_credentials(
    wire: &SecretWire,
    prior: Option<&SecretDetails>,
) -> Result<SecretDetails> {
    let prior = match prior {
        Some(SecretDetails::IamCredentials(p)) => p.clone(),
        _ => IamCredentialsFields::default(),
    };
    Ok(SecretDetails::IamCredentials(IamCredentialsFields {
        ttl: decode_ttl(
            "iam_credentials",
            "ttl",
            wire.ttl_seconds,
            wire.ttl.as_ref(),
            &prior.ttl,
        )?,
        access_groups: wire.access_groups.clone().into(),
        service_id: wire.service_id.clone().into(),
        reuse_api_key: carried(wire.reuse_api_key.as_ref(), &prior.reuse_api_key),
        rotation: decode_rotation("iam_credentials", RotationShape::Common, wire)?,
        api_key: carried_sensitive(wire.api_key.as_ref(), &prior.api_key),
        api_key_id: wire.api_key_id.clone().into(),
        service_id_is_static: wire.service_id_is_static.into(),
        account_id: wire.account_id.clone().into(),
        next_rotation_date: wire.next_rotation_date.into(),
    }))
}

pub(crate) fn decode_service_credentials(
    wire: &SecretWire,
    prior: Option<&SecretDetails>,
) -> Result<SecretDetails> {
    let prior = match prior {
        Some(SecretDetails::ServiceCredentials(p)) => p.clone(),
        _ => ServiceCredentialsFields::default(),
    };
    Ok(SecretDetails::ServiceCredentials(ServiceCredentialsFields {
        ttl: decode_ttl(
            "service_credentials",
            "ttl",
            wire.ttl_seconds,
            wire.ttl.as_ref(),
            &prior.ttl,
        )?,
        source_service: wire
            .source_service
            .as_ref()
            .map(decode_source_service)
            .into(),
        rotation: decode_rotation("service_credentials", RotationShape::Common, wire)?,
        credentials: wire.credentials.clone().into(),
        next_rotation_date: wire.next_rotation_date.into(),
    }))
}

pub(crate) fn decode_imported_cert(
    wire: &SecretWire,
    prior: Option<&SecretDetails>,
) -> Result<SecretDetails> {
    let prior = match prior {
        Some(SecretDetails::ImportedCert(p)) => p.clone(),
        _ => ImportedCertFields::default(),
    };
    Ok(SecretDetails::ImportedCert(ImportedCertFields {
        certificate: wire.certificate.clone().into(),
        intermediate: carried(wire.intermediate.as_ref(), &prior.intermediate),
        private_key: carried_sensitive(wire.private_key.as_ref(), &prior.private_key),
        common_name: wire.common_name.clone().into(),
        alt_names: wire.alt_names.clone().into(),
        key_algorithm: wire.key_algorithm.clone().into(),
        issuer: wire.issuer.clone().into(),
        serial_number: wire.serial_number.clone().into(),
        expiration_date: wire.expiration_date.into(),
        intermediate_included: wire.intermediate_included.into(),
        private_key_included: wire.private_key_included.into(),
    }))
}

pub(crate) fn decode_public_cert(
    wire: &SecretWire,
    prior: Option<&SecretDetails>,
) -> Result<SecretDetails> {
    let prior = match prior {
        Some(SecretDetails::PublicCert(p)) => p.clone(),
        _ => PublicCertFields::default(),
    };

    // `akamai` is sent as `manual`; keep the caller's spelling on read
    let dns = match (wire.dns.as_deref(), prior.dns.get().map(String::as_str)) {
        (Some("manual"), Some("akamai")) => prior.dns.clone(),
        _ => carried(wire.dns.as_ref(), &prior.dns),
    };

    Ok(SecretDetails::PublicCert(PublicCertFields {
        common_name: wire.common_name.clone().into(),
        alt_names: wire.alt_names.clone().into(),
        key_algorithm: wire.key_algorithm.clone().into(),
        ca: carried(wire.ca.as_ref(), &prior.ca),
        dns,
        bundle_certs: carried(wire.bundle_certs.as_ref(), &prior.bundle_certs),
        rotation: decode_rotation("public_cert", RotationShape::Restricted, wire)?,
        issued: decode_issued(wire, &prior.issued),
    }))
}

pub(crate) fn decode_private_cert(
    wire: &SecretWire,
    prior: Option<&SecretDetails>,
) -> Result<SecretDetails> {
    let prior = match prior {
        Some(SecretDetails::PrivateCert(p)) => p.clone(),
        _ => PrivateCertFields::default(),
    };
    Ok(SecretDetails::PrivateCert(PrivateCertFields {
        certificate_template: wire.certificate_template.clone().into(),
        common_name: wire.common_name.clone().into(),
        alt_names: wire.alt_names.clone().into(),
        ip_sans: carried(wire.ip_sans.as_ref(), &prior.ip_sans),
        uri_sans: carried(wire.uri_sans.as_ref(), &prior.uri_sans),
        other_sans: carried(wire.other_sans.as_ref(), &prior.other_sans),
        ttl: decode_ttl(
            "private_cert",
            "ttl",
            wire.ttl_seconds,
            wire.ttl.as_ref(),
            &prior.ttl,
        )?,
        format: carried(wire.format.as_ref(), &prior.format),
        private_key_format: carried(wire.private_key_format.as_ref(), &prior.private_key_format),
        exclude_cn_from_sans: carried(
            wire.exclude_cn_from_sans.as_ref(),
            &prior.exclude_cn_from_sans,
        ),
        rotation: decode_rotation("private_cert", RotationShape::Common, wire)?,
        certificate_authority: wire.certificate_authority.clone().into(),
        issuing_ca: wire.issuing_ca.clone().into(),
        ca_chain: wire.ca_chain.clone().into(),
        issued: decode_issued(wire, &prior.issued),
    }))
}

fn collect_issued(issued: &IssuedCertificate, out: &mut FieldSet) {
    out.put("certificate", &issued.certificate);
    out.put("intermediate", &issued.intermediate);
    out.put("private_key", &issued.private_key);
    out.put("issuer", &issued.issuer);
    out.put("serial_number", &issued.serial_number);
    out.put("expiration_date", &issued.expiration_date);
}

/// Flatten kind attributes into `out`, keyed by wire name
pub(crate) fn collect(details: &SecretDetails, out: &mut FieldSet) {
    match details {
        SecretDetails::Arbitrary(f) => {
            out.put("payload", &f.payload);
            out.put("expiration_date", &f.expiration_date);
        }
        SecretDetails::Kv(f) => out.put("data", &f.data),
        SecretDetails::UsernamePassword(f) => {
            out.put("username", &f.username);
            out.put("password", &f.password);
            out.put("expiration_date", &f.expiration_date);
            out.put("rotation", &f.rotation);
            out.put("next_rotation_date", &f.next_rotation_date);
        }
        SecretDetails::IamCredentials(f) => {
            out.put("ttl", &f.ttl);
            out.put("access_groups", &f.access_groups);
            out.put("service_id", &f.service_id);
            out.put("reuse_api_key", &f.reuse_api_key);
            out.put("rotation", &f.rotation);
            out.put("api_key", &f.api_key);
            out.put("api_key_id", &f.api_key_id);
            out.put("service_id_is_static", &f.service_id_is_static);
            out.put("account_id", &f.account_id);
            out.put("next_rotation_date", &f.next_rotation_date);
        }
        SecretDetails::ServiceCredentials(f) => {
            out.put("ttl", &f.ttl);
            out.put("source_service", &f.source_service);
            out.put("rotation", &f.rotation);
            out.put("credentials", &f.credentials);
            out.put("next_rotation_date", &f.next_rotation_date);
        }
        SecretDetails::ImportedCert(f) => {
            out.put("certificate", &f.certificate);
            out.put("intermediate", &f.intermediate);
            out.put("private_key", &f.private_key);
            out.put("common_name", &f.common_name);
            out.put("alt_names", &f.alt_names);
            out.put("key_algorithm", &f.key_algorithm);
            out.put("issuer", &f.issuer);
            out.put("serial_number", &f.serial_number);
            out.put("expiration_date", &f.expiration_date);
            out.put("intermediate_included", &f.intermediate_included);
            out.put("private_key_included", &f.private_key_included);
        }
        SecretDetails::PublicCert(f) => {
            out.put("common_name", &f.common_name);
            out.put("alt_names", &f.alt_names);
            out.put("key_algorithm", &f.key_algorithm);
            out.put("ca", &f.ca);
            out.put("dns", &f.dns);
            out.put("bundle_certs", &f.bundle_certs);
            out.put("rotation", &f.rotation);
            collect_issued(&f.issued, out);
        }
        SecretDetails::PrivateCert(f) => {
            out.put("certificate_template", &f.certificate_template);
            out.put("common_name", &f.common_name);
            out.put("alt_names", &f.alt_names);
            out.put("ip_sans", &f.ip_sans);
            out.put("uri_sans", &f.uri_sans);
            out.put("other_sans", &f.other_sans);
            out.put("ttl", &f.ttl);
            out.put("format", &f.format);
            out.put("private_key_format", &f.private_key_format);
            out.put("exclude_cn_from_sans", &f.exclude_cn_from_sans);
            out.put("rotation", &f.rotation);
            out.put("certificate_authority", &f.certificate_authority);
            out.put("issuing_ca", &f.issuing_ca);
            out.put("ca_chain", &f.ca_chain);
            collect_issued(&f.issued, out);
        }
    }
}

/// Last-mile rewrites of a create prototype
pub(crate) fn adjust_prototype(details: &SecretDetails, body: &mut Map<String, Value>) {
    if let SecretDetails::PublicCert(fields) = details {
        if fields.dns.get().map(String::as_str) == Some("akamai") {
            body.insert("dns".into(), Value::String("manual".into()));
        }
    }
}

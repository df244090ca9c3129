//! # Resource Codec
//!
//! Converts between local attributes and wire payloads.
//!
//! - **Decode**: the discriminator is resolved through the registry before
//!   anything else is read, so an unknown kind never yields a partially
//!   decoded value. Absent wire members stay `Absent`; write-only members the
//!   remote never echoes are carried over from the prior local state.
//! - **Encode**: attributes are flattened into a [`FieldSet`] and projected on
//!   the kind's create fields. Absent attributes are omitted.
//!
//! The same [`FieldSet`] view is what the patch builder diffs, which keeps
//! "what we send" and "what we compare" in one place.

pub mod configurations;
pub mod secrets;
pub mod wire;

use crate::error::{Error, Result};
use crate::model::{
    metadata_from_wire, ConfigurationAttributes, CryptoKey, Field, IntermediateCaFields,
    RotationPolicy, SecretAttributes, Sensitive, SourceService, TtlValue,
};
use crate::registry::{resolve_config, resolve_secret, ConfigKind, SecretKind};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use wire::{ConfigurationWire, SecretVersionMetadataWire, SecretWire, TtlWire};

/// Comparable value of one attribute
#[derive(Debug, Clone)]
pub enum FieldValue {
    Json(Value),
    /// Compared by seconds, sent in the caller's spelling
    Duration(TtlValue),
}

impl FieldValue {
    #[must_use]
    pub fn to_wire(&self) -> Value {
        match self {
            FieldValue::Json(value) => value.clone(),
            FieldValue::Duration(ttl) => Value::String(ttl.to_wire()),
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Json(a), FieldValue::Json(b)) => a == b,
            (FieldValue::Duration(a), FieldValue::Duration(b)) => a == b,
            _ => false,
        }
    }
}

/// Conversion of an attribute value into its comparable wire form
pub trait ToFieldValue {
    fn to_field_value(&self) -> FieldValue;
}

impl ToFieldValue for String {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Json(Value::String(self.clone()))
    }
}

impl ToFieldValue for bool {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Json(Value::Bool(*self))
    }
}

impl ToFieldValue for i64 {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Json(Value::from(*self))
    }
}

impl ToFieldValue for Vec<String> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Json(Value::Array(
            self.iter().cloned().map(Value::String).collect(),
        ))
    }
}

impl ToFieldValue for BTreeMap<String, String> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Json(Value::Object(
            self.iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        ))
    }
}

impl ToFieldValue for Map<String, Value> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Json(Value::Object(self.clone()))
    }
}

impl ToFieldValue for Value {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Json(self.clone())
    }
}

impl ToFieldValue for TtlValue {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Duration(self.clone())
    }
}

impl ToFieldValue for Sensitive {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Json(Value::String(self.expose().to_string()))
    }
}

impl ToFieldValue for DateTime<Utc> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Json(Value::String(
            self.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        ))
    }
}

impl ToFieldValue for RotationPolicy {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Json(self.to_value())
    }
}

impl ToFieldValue for CryptoKey {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Json(self.to_value())
    }
}

impl ToFieldValue for SourceService {
    fn to_field_value(&self) -> FieldValue {
        let mut out = Map::new();
        if let Some(crn) = self.instance_crn.get() {
            out.insert("instance".into(), serde_json::json!({ "crn": crn }));
        }
        if let Some(crn) = self.role_crn.get() {
            out.insert("role".into(), serde_json::json!({ "crn": crn }));
        }
        if let Some(parameters) = self.parameters.get() {
            out.insert("parameters".into(), Value::Object(parameters.clone()));
        }
        FieldValue::Json(Value::Object(out))
    }
}

/// Flat view of the set attributes of one resource, keyed by wire name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet(BTreeMap<&'static str, FieldValue>);

impl FieldSet {
    /// Record `field` under `name` when it is set
    pub fn put<T: ToFieldValue>(&mut self, name: &'static str, field: &Field<T>) {
        if let Some(value) = field.get() {
            self.0.insert(name, value.to_field_value());
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Wire object restricted to `names`
    #[must_use]
    pub fn project(&self, names: &[&str]) -> Map<String, Value> {
        self.0
            .iter()
            .filter(|(name, _)| names.contains(name))
            .map(|(name, value)| ((*name).to_string(), value.to_wire()))
            .collect()
    }
}

/// Field set of a secret: envelope, version metadata and kind attributes
#[must_use]
pub fn secret_field_set(secret: &SecretAttributes) -> FieldSet {
    let mut out = FieldSet::default();
    let envelope = &secret.envelope;
    out.put("name", &envelope.name);
    out.put("description", &envelope.description);
    out.put("secret_group_id", &envelope.secret_group_id);
    out.put("labels", &envelope.labels);
    out.put("custom_metadata", &envelope.custom_metadata);
    out.put("version_custom_metadata", &secret.version_custom_metadata);
    secrets::collect(&secret.details, &mut out);
    out
}

#[must_use]
pub fn configuration_field_set(configuration: &ConfigurationAttributes) -> FieldSet {
    let mut out = FieldSet::default();
    out.put("name", &configuration.envelope.name);
    configurations::collect(&configuration.details, &mut out);
    out
}

/// Build the create prototype for a secret
pub fn encode_secret(desired: &SecretAttributes) -> Result<Value> {
    let codec = desired.kind().codec();
    if let (Some(Field::Set(policy)), Some(shape)) = (desired.details.rotation(), codec.rotation) {
        if policy.shape() != shape {
            return Err(Error::codec(
                codec.tag,
                "rotation",
                format!("this kind requires a {shape:?} rotation policy"),
            ));
        }
    }

    let mut body = secret_field_set(desired).project(codec.create_fields);
    secrets::adjust_prototype(&desired.details, &mut body);
    body.insert("secret_type".into(), Value::String(codec.tag.to_string()));
    Ok(Value::Object(body))
}

/// Decode a secret response.
///
/// `expected` guards against the remote answering with another kind; `prior`
/// supplies write-only members and configured TTL spellings.
pub fn decode_secret(
    body: Value,
    expected: Option<SecretKind>,
    prior: Option<&SecretAttributes>,
) -> Result<SecretAttributes> {
    let tag = discriminator(&body, "secret_type", "secret")?;
    let codec = resolve_secret(&tag)?;
    if let Some(expected) = expected {
        if expected != codec.kind {
            return Err(Error::KindMismatch {
                family: "secret",
                expected: expected.tag(),
                actual: tag,
            });
        }
    }

    let wire: SecretWire = from_body(body, codec.tag)?;
    let prior = prior.filter(|p| p.kind() == codec.kind);
    let details = (codec.decode)(&wire, prior.map(|p| &p.details))?;

    let version_custom_metadata = match &wire.version_custom_metadata {
        Some(map) => Field::Set(metadata_from_wire(map)),
        None => prior.map_or(Field::Absent, |p| p.version_custom_metadata.clone()),
    };

    Ok(SecretAttributes {
        envelope: secrets::decode_envelope(codec.tag, &wire)?,
        version_custom_metadata,
        details,
        extra: wire.extra,
    })
}

/// Decode the metadata of one secret version
pub fn decode_version_metadata(body: Value) -> Result<Field<BTreeMap<String, String>>> {
    let wire: SecretVersionMetadataWire = from_body(body, "secret_version")?;
    Ok(wire
        .version_custom_metadata
        .map(|map| metadata_from_wire(&map))
        .into())
}

/// Build the create prototype for a configuration
pub fn encode_configuration(desired: &ConfigurationAttributes) -> Result<Value> {
    let codec = desired.kind().codec();
    if desired.envelope.name.is_absent() {
        return Err(Error::codec(codec.tag, "name", "configurations are keyed by name"));
    }
    let mut body = configuration_field_set(desired).project(codec.create_fields);
    body.insert("config_type".into(), Value::String(codec.tag.to_string()));
    Ok(Value::Object(body))
}

/// Build the action that signs intermediate CA `name` with its issuer
#[must_use]
pub fn encode_sign_intermediate(name: &str, intermediate: &IntermediateCaFields) -> Value {
    Value::Object(configurations::sign_intermediate_action(name, intermediate))
}

pub fn decode_configuration(
    body: Value,
    expected: Option<ConfigKind>,
    prior: Option<&ConfigurationAttributes>,
) -> Result<ConfigurationAttributes> {
    let tag = discriminator(&body, "config_type", "configuration")?;
    let codec = resolve_config(&tag)?;
    if let Some(expected) = expected {
        if expected != codec.kind {
            return Err(Error::KindMismatch {
                family: "configuration",
                expected: expected.tag(),
                actual: tag,
            });
        }
    }

    let wire: ConfigurationWire = from_body(body, codec.tag)?;
    let prior = prior.filter(|p| p.kind() == codec.kind);
    let details = (codec.decode)(&wire, prior.map(|p| &p.details))?;

    Ok(ConfigurationAttributes {
        envelope: configurations::decode_envelope(&wire),
        details,
        extra: wire.extra,
    })
}

fn discriminator(body: &Value, key: &'static str, family: &'static str) -> Result<String> {
    body.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| Error::codec(family, key, "missing kind discriminator"))
}

fn from_body<T: DeserializeOwned>(body: Value, kind: &'static str) -> Result<T> {
    serde_json::from_value(body).map_err(|e| Error::codec(kind, "body", e.to_string()))
}

/// Wire value when present, otherwise whatever was known before
pub(crate) fn carried<T: Clone>(wire: Option<&T>, prior: &Field<T>) -> Field<T> {
    match wire {
        Some(value) => Field::Set(value.clone()),
        None => prior.clone(),
    }
}

pub(crate) fn carried_sensitive(wire: Option<&String>, prior: &Field<Sensitive>) -> Field<Sensitive> {
    match wire {
        Some(value) => Field::Set(Sensitive::new(value.as_str())),
        None => prior.clone(),
    }
}

/// Decode a duration reported as `<field>_seconds` and/or `<field>`
pub(crate) fn decode_ttl(
    kind: &'static str,
    field: &'static str,
    seconds: Option<u64>,
    text: Option<&TtlWire>,
    prior: &Field<TtlValue>,
) -> Result<Field<TtlValue>> {
    let seconds = match (seconds, text) {
        (Some(seconds), _) => Some(seconds),
        (None, Some(TtlWire::Seconds(seconds))) => Some(*seconds),
        (None, Some(TtlWire::Text(text))) => Some(match text.trim().parse::<u64>() {
            Ok(seconds) => seconds,
            Err(_) => TtlValue::parse(text)
                .map_err(|e| Error::codec(kind, field, e.to_string()))?
                .seconds(),
        }),
        (None, None) => None,
    };

    Ok(match seconds {
        Some(seconds) => Field::Set(TtlValue::reconcile(seconds, prior.get())),
        None => prior.clone(),
    })
}

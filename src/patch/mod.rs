//! # Patch Builder
//!
//! Computes the minimal update between a desired and an observed resource.
//!
//! A [`Patch`] only ever contains fields the kind declares mutable; the
//! builder refuses anything else before a patch exists. Fields that are
//! creatable but not mutable are checked separately: if the caller changed
//! one the update fails with [`Error::ImmutableFieldConflict`] instead of
//! silently dropping the change.
//!
//! Secret updates split into up to three calls: the metadata patch, the
//! version-metadata patch and, for kinds whose payload is versioned, a new
//! secret version.

use crate::codec::{configuration_field_set, secret_field_set, FieldSet};
use crate::error::{Error, Result};
use crate::model::{ConfigurationAttributes, SecretAttributes};
use crate::registry::VERSION_METADATA_FIELDS;
use serde_json::{Map, Value};

/// Changed, mutable fields in wire form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    fields: Map<String, Value>,
}

impl Patch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    #[must_use]
    pub fn into_json(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Accumulates fields for one patch, enforcing the kind's mutable set
#[derive(Debug)]
pub struct PatchBuilder {
    kind: &'static str,
    allowed: &'static [&'static str],
    fields: Map<String, Value>,
}

impl PatchBuilder {
    #[must_use]
    pub fn new(kind: &'static str, allowed: &'static [&'static str]) -> Self {
        Self {
            kind,
            allowed,
            fields: Map::new(),
        }
    }

    pub fn set(&mut self, field: &'static str, value: Value) -> Result<&mut Self> {
        if !self.allowed.contains(&field) {
            return Err(Error::ImmutableFieldConflict {
                kind: self.kind,
                field,
            });
        }
        self.fields.insert(field.to_string(), value);
        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> Patch {
        Patch {
            fields: self.fields,
        }
    }
}

/// Patch of the fields in `mutable` whose desired value differs from the observed one.
///
/// Absent desired fields are left alone.
pub fn build_patch(
    kind: &'static str,
    desired: &FieldSet,
    observed: &FieldSet,
    mutable: &'static [&'static str],
) -> Result<Patch> {
    let mut builder = PatchBuilder::new(kind, mutable);
    for &name in mutable {
        if let Some(value) = desired.get(name) {
            if observed.get(name) != Some(value) {
                builder.set(name, value.to_wire())?;
            }
        }
    }
    Ok(builder.build())
}

/// Reject changes to fields outside `changeable`.
///
/// Only fields the kind sends on create are considered; server-computed
/// members are never user input. A field the remote does not report cannot
/// conflict.
pub fn check_immutable(
    kind: &'static str,
    create_fields: &'static [&'static str],
    changeable: &[&str],
    desired: &FieldSet,
    observed: &FieldSet,
) -> Result<()> {
    for &field in create_fields {
        if changeable.contains(&field) {
            continue;
        }
        if let (Some(want), Some(have)) = (desired.get(field), observed.get(field)) {
            if want != have {
                return Err(Error::ImmutableFieldConflict { kind, field });
            }
        }
    }
    Ok(())
}

/// Calls needed to move a secret from its observed to its desired state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecretUpdatePlan {
    /// `PATCH /secrets/{id}/metadata`
    pub metadata: Patch,
    /// `PATCH /secrets/{id}/versions/current/metadata`
    pub version_metadata: Patch,
    /// `POST /secrets/{id}/versions`
    pub new_version: Option<Map<String, Value>>,
}

impl SecretUpdatePlan {
    /// True when the update needs no remote call at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty() && self.version_metadata.is_empty() && self.new_version.is_none()
    }
}

pub fn plan_secret_update(
    desired: &SecretAttributes,
    observed: &SecretAttributes,
) -> Result<SecretUpdatePlan> {
    let codec = observed.kind().codec();
    if desired.kind() != observed.kind() {
        return Err(Error::KindMismatch {
            family: "secret",
            expected: codec.tag,
            actual: desired.kind().tag().to_string(),
        });
    }

    let want = secret_field_set(desired);
    let have = secret_field_set(observed);
    let changeable: Vec<&str> = codec.changeable_fields().collect();
    check_immutable(codec.tag, codec.create_fields, &changeable, &want, &have)?;

    let metadata = build_patch(codec.tag, &want, &have, codec.mutable_fields)?;

    let payload_changed = codec.new_version_fields.iter().any(|name| {
        want.get(name)
            .is_some_and(|value| have.get(name) != Some(value))
    });

    if payload_changed {
        // The new version carries its own metadata
        let mut names: Vec<&str> = codec.new_version_fields.to_vec();
        names.extend_from_slice(VERSION_METADATA_FIELDS);
        return Ok(SecretUpdatePlan {
            metadata,
            version_metadata: Patch::default(),
            new_version: Some(want.project(&names)),
        });
    }

    let version_metadata = build_patch(codec.tag, &want, &have, VERSION_METADATA_FIELDS)?;
    Ok(SecretUpdatePlan {
        metadata,
        version_metadata,
        new_version: None,
    })
}

pub fn plan_configuration_update(
    desired: &ConfigurationAttributes,
    observed: &ConfigurationAttributes,
) -> Result<Patch> {
    let codec = observed.kind().codec();
    if desired.kind() != observed.kind() {
        return Err(Error::KindMismatch {
            family: "configuration",
            expected: codec.tag,
            actual: desired.kind().tag().to_string(),
        });
    }

    let want = configuration_field_set(desired);
    let have = configuration_field_set(observed);
    check_immutable(
        codec.tag,
        codec.create_fields,
        codec.mutable_fields,
        &want,
        &have,
    )?;
    build_patch(codec.tag, &want, &have, codec.mutable_fields)
}

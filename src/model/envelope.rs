//! Attributes shared by every resource, whatever its kind.

use crate::model::{Field, LifecycleStatus};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Common metadata of a secret or configuration
///
/// Configurations only populate `name`, `created_by`, `created_at` and
/// `updated_at`; the remaining members stay `Absent` for them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceEnvelope {
    /// Server-assigned identifier (secrets only)
    pub id: Field<String>,
    pub name: Field<String>,
    pub description: Field<String>,
    pub secret_group_id: Field<String>,
    pub labels: Field<Vec<String>>,
    pub custom_metadata: Field<BTreeMap<String, String>>,
    pub crn: Field<String>,
    pub created_by: Field<String>,
    pub created_at: Field<DateTime<Utc>>,
    pub updated_at: Field<DateTime<Utc>>,
    pub versions_total: Field<i64>,
    pub locks_total: Field<i64>,
    pub downloaded: Field<bool>,
    /// `None` for resources that do not track lifecycle
    pub lifecycle: Option<LifecycleStatus>,
}

impl ResourceEnvelope {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Field::Set(name.into()),
            ..Self::default()
        }
    }
}

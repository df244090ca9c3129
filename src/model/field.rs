//! # Tri-state Attributes
//!
//! Local attributes are either absent (unknown/unset, never sent to the
//! remote) or set to a concrete value. Absence is the zero value: decoding
//! a wire payload that omits a field leaves the attribute `Absent`.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A local attribute that is either absent or set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    /// Not known locally; omitted from prototypes and patches
    Absent,
    /// Explicitly set to a value
    Set(T),
}

impl<T> Field<T> {
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        matches!(self, Field::Set(_))
    }

    /// Borrow the value, if set
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        match self {
            Field::Set(value) => Some(value),
            Field::Absent => None,
        }
    }

    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Set(value) => Some(value),
            Field::Absent => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Set(value) => Field::Set(f(value)),
            Field::Absent => Field::Absent,
        }
    }

    /// Keep `self` when set, otherwise fall back to `other`
    #[must_use]
    pub fn or(self, other: Field<T>) -> Field<T> {
        match self {
            Field::Set(_) => self,
            Field::Absent => other,
        }
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Field::Set(value),
            None => Field::Absent,
        }
    }
}

/// Credential material (passwords, API keys, private keys)
///
/// Wiped from memory on drop and redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Sensitive(String);

impl Sensitive {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw value. Only call this when building a request body.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Sensitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sensitive(***)")
    }
}

impl From<&str> for Sensitive {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Sensitive {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Flatten a wire metadata map (arbitrary JSON values) into the local
/// key → string representation
#[must_use]
pub fn metadata_from_wire(map: &serde_json::Map<String, Value>) -> BTreeMap<String, String> {
    map.iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_is_default() {
        let field: Field<String> = Field::default();
        assert!(field.is_absent());
        assert_eq!(field.get(), None);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Field::from(Some(3)), Field::Set(3));
        assert_eq!(Field::<i32>::from(None), Field::Absent);
    }

    #[test]
    fn test_or_prefers_set_value() {
        assert_eq!(Field::Set(1).or(Field::Set(2)), Field::Set(1));
        assert_eq!(Field::Absent.or(Field::Set(2)), Field::Set(2));
    }

    #[test]
    fn test_sensitive_debug_is_redacted() {
        let secret = Sensitive::new("hunter2");
        assert_eq!(format!("{secret:?}"), "Sensitive(***)");
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn test_metadata_from_wire_stringifies_scalars() {
        let wire = json!({"team": "payments", "tier": 2, "pci": true});
        let map = metadata_from_wire(wire.as_object().unwrap());
        assert_eq!(map["team"], "payments");
        assert_eq!(map["tier"], "2");
        assert_eq!(map["pci"], "true");
    }
}

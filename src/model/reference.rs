//! # Resource References
//!
//! Persisted references have the form `region/instance_id/key`, where `key`
//! is the secret id for secrets and the configuration name for
//! configurations. A reference always carries the instance it belongs to, so
//! a stored reference can be resolved without any other context.

use crate::constants::API_PREFIX;
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

const REFERENCE_FORMAT: &str = "region/instance_id/key";

/// Which network endpoint of the instance to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointType {
    #[default]
    Public,
    Private,
}

impl FromStr for EndpointType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "public" | "" => Ok(EndpointType::Public),
            "private" => Ok(EndpointType::Private),
            other => Err(Error::Config(format!(
                "endpoint type must be 'public' or 'private', got '{other}'"
            ))),
        }
    }
}

/// The (region, instance) pair a client is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceScope {
    pub region: String,
    pub instance_id: String,
    pub endpoint_type: EndpointType,
}

impl InstanceScope {
    pub fn new(region: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            instance_id: instance_id.into(),
            endpoint_type: EndpointType::Public,
        }
    }

    #[must_use]
    pub fn with_endpoint_type(mut self, endpoint_type: EndpointType) -> Self {
        self.endpoint_type = endpoint_type;
        self
    }

    /// Service URL for this instance (without the API prefix)
    #[must_use]
    pub fn base_url(&self) -> String {
        match self.endpoint_type {
            EndpointType::Public => format!(
                "https://{}.{}.secrets-manager.appdomain.cloud",
                self.instance_id, self.region
            ),
            EndpointType::Private => format!(
                "https://{}.private.{}.secrets-manager.appdomain.cloud",
                self.instance_id, self.region
            ),
        }
    }

    /// Full API root, e.g. `https://<id>.us-south.secrets-manager.appdomain.cloud/api/v2`
    #[must_use]
    pub fn api_root(&self) -> String {
        format!("{}{API_PREFIX}", self.base_url())
    }

    /// Reference to a resource inside this instance
    pub fn reference(&self, key: impl Into<String>) -> ResourceRef {
        ResourceRef {
            region: self.region.clone(),
            instance_id: self.instance_id.clone(),
            key: key.into(),
        }
    }

    #[must_use]
    pub fn contains(&self, reference: &ResourceRef) -> bool {
        self.region == reference.region && self.instance_id == reference.instance_id
    }
}

impl fmt::Display for InstanceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.region, self.instance_id)
    }
}

/// Persistable composite identifier of a remote resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    pub region: String,
    pub instance_id: String,
    pub key: String,
}

impl ResourceRef {
    pub fn parse(reference: &str) -> Result<Self> {
        let bad = || Error::BadReferenceFormat {
            reference: reference.to_string(),
            expected: REFERENCE_FORMAT,
        };

        let segments: Vec<&str> = reference.split('/').collect();
        let [region, instance_id, key] = segments.as_slice() else {
            return Err(bad());
        };
        if region.is_empty() || instance_id.is_empty() || key.is_empty() {
            return Err(bad());
        }

        Ok(Self {
            region: (*region).to_string(),
            instance_id: (*instance_id).to_string(),
            key: (*key).to_string(),
        })
    }
}

impl FromStr for ResourceRef {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.region, self.instance_id, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let reference = ResourceRef::parse("us-south/1234-abcd/5678-efgh").unwrap();
        assert_eq!(reference.region, "us-south");
        assert_eq!(reference.instance_id, "1234-abcd");
        assert_eq!(reference.key, "5678-efgh");
        assert_eq!(reference.to_string(), "us-south/1234-abcd/5678-efgh");
    }

    #[test]
    fn test_parse_rejects_wrong_segment_counts() {
        for bad in ["", "us-south", "us-south/abc", "a/b/c/d", "a//c", "/b/c", "a/b/"] {
            let err = ResourceRef::parse(bad).unwrap_err();
            assert!(
                matches!(err, Error::BadReferenceFormat { .. }),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn test_base_urls() {
        let scope = InstanceScope::new("eu-de", "abc");
        assert_eq!(
            scope.base_url(),
            "https://abc.eu-de.secrets-manager.appdomain.cloud"
        );
        let private = scope.with_endpoint_type(EndpointType::Private);
        assert_eq!(
            private.api_root(),
            "https://abc.private.eu-de.secrets-manager.appdomain.cloud/api/v2"
        );
    }

    #[test]
    fn test_scope_contains() {
        let scope = InstanceScope::new("us-south", "abc");
        assert!(scope.contains(&scope.reference("id-1")));
        assert!(!scope.contains(&ResourceRef::parse("eu-de/abc/id-1").unwrap()));
    }

    #[test]
    fn test_endpoint_type_from_str() {
        assert_eq!("private".parse::<EndpointType>().unwrap(), EndpointType::Private);
        assert_eq!("PUBLIC".parse::<EndpointType>().unwrap(), EndpointType::Public);
        assert!("direct".parse::<EndpointType>().is_err());
    }
}

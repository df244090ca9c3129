//! # Model
//!
//! Local attribute types for secrets and configurations.
//!
//! - `field`: tri-state attributes and credential wrappers
//! - `duration`: TTL values with preserved spelling
//! - `state`: lifecycle codes and readiness classification
//! - `rotation`, `ca_data`: context-dependent nested shapes
//! - `reference`: persisted references and instance scope
//! - `envelope`, `secret`, `configuration`: attribute blocks per resource family

pub mod ca_data;
pub mod configuration;
pub mod crypto_key;
pub mod duration;
pub mod envelope;
pub mod field;
pub mod reference;
pub mod rotation;
pub mod secret;
pub mod state;

pub use ca_data::{CaData, CaDataShape, CaDataWire};
pub use configuration::*;
pub use crypto_key::{
    CryptoKey, CryptoKeyProvider, CryptoKeyWire, CryptoProviderKind, CryptoProviderWire,
};
pub use duration::TtlValue;
pub use envelope::ResourceEnvelope;
pub use field::{metadata_from_wire, Field, Sensitive};
pub use reference::{EndpointType, InstanceScope, ResourceRef};
pub use rotation::{RotationPolicy, RotationPolicyWire, RotationShape};
pub use secret::*;
pub use state::{classify_code, LifecycleState, LifecycleStatus, Readiness};

//! Rotation policies. The shape is fixed by the secret kind: public
//! certificates only understand `auto_rotate` and `rotate_keys`, every other
//! rotating kind uses the interval form.

use crate::error::{Error, Result};
use crate::model::Field;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which rotation policy a kind carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationShape {
    /// `auto_rotate` + `interval` + `unit`
    Common,
    /// `auto_rotate` + `rotate_keys`
    Restricted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationPolicy {
    Common {
        auto_rotate: Field<bool>,
        interval: Field<i64>,
        /// `day` or `month`
        unit: Field<String>,
    },
    Restricted {
        auto_rotate: Field<bool>,
        rotate_keys: Field<bool>,
    },
}

/// Rotation object as it appears on the wire
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationPolicyWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_rotate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate_keys: Option<bool>,
}

impl RotationPolicy {
    #[must_use]
    pub fn shape(&self) -> RotationShape {
        match self {
            RotationPolicy::Common { .. } => RotationShape::Common,
            RotationPolicy::Restricted { .. } => RotationShape::Restricted,
        }
    }

    /// Decode a wire rotation object into the shape the kind dictates
    pub fn decode(kind: &'static str, shape: RotationShape, wire: &RotationPolicyWire) -> Result<Self> {
        match shape {
            RotationShape::Common => {
                if wire.rotate_keys.is_some() {
                    return Err(Error::codec(
                        kind,
                        "rotation",
                        "rotate_keys is only valid for restricted rotation policies",
                    ));
                }
                Ok(RotationPolicy::Common {
                    auto_rotate: wire.auto_rotate.into(),
                    interval: wire.interval.into(),
                    unit: wire.unit.clone().into(),
                })
            }
            RotationShape::Restricted => {
                if wire.interval.is_some() || wire.unit.is_some() {
                    return Err(Error::codec(
                        kind,
                        "rotation",
                        "interval and unit are not supported by this kind's rotation policy",
                    ));
                }
                Ok(RotationPolicy::Restricted {
                    auto_rotate: wire.auto_rotate.into(),
                    rotate_keys: wire.rotate_keys.into(),
                })
            }
        }
    }

    /// JSON object with only the set members
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        let mut put = |key: &str, value: Option<Value>| {
            if let Some(value) = value {
                out.insert(key.to_string(), value);
            }
        };
        match self {
            RotationPolicy::Common {
                auto_rotate,
                interval,
                unit,
            } => {
                put("auto_rotate", auto_rotate.get().map(|v| Value::Bool(*v)));
                put("interval", interval.get().map(|v| Value::from(*v)));
                put("unit", unit.get().map(|v| Value::String(v.clone())));
            }
            RotationPolicy::Restricted {
                auto_rotate,
                rotate_keys,
            } => {
                put("auto_rotate", auto_rotate.get().map(|v| Value::Bool(*v)));
                put("rotate_keys", rotate_keys.get().map(|v| Value::Bool(*v)));
            }
        }
        Value::Object(out)
    }
}

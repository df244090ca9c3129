//! Cryptographic key backing a private CA. The key lives in an external
//! crypto provider; the provider object is tagged by `type` and only the
//! Hyper Protect Crypto Services variant exists today.

use crate::error::{Error, Result};
use crate::model::Field;
use serde::Deserialize;
use serde_json::{Map, Value};

const HPCS_TAG: &str = "hyper_protect_crypto_services";

/// Closed set of crypto provider discriminators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoProviderKind {
    HyperProtectCryptoServices,
}

impl CryptoProviderKind {
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            CryptoProviderKind::HyperProtectCryptoServices => HPCS_TAG,
        }
    }

    /// # Errors
    /// [`Error::UnrecognizedVariant`] for any other tag
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            HPCS_TAG => Ok(CryptoProviderKind::HyperProtectCryptoServices),
            other => Err(Error::UnrecognizedVariant {
                family: "crypto provider",
                tag: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoKeyProvider {
    HyperProtectCryptoServices {
        instance_crn: Field<String>,
        pin_iam_credentials_secret_id: Field<String>,
        private_keystore_id: Field<String>,
    },
}

impl CryptoKeyProvider {
    #[must_use]
    pub fn kind(&self) -> CryptoProviderKind {
        match self {
            CryptoKeyProvider::HyperProtectCryptoServices { .. } => {
                CryptoProviderKind::HyperProtectCryptoServices
            }
        }
    }
}

/// Key lookup (by `id` or `label`) and optional generation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CryptoKey {
    pub id: Field<String>,
    pub label: Field<String>,
    pub allow_generate_key: Field<bool>,
    pub provider: Field<CryptoKeyProvider>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CryptoProviderWire {
    #[serde(rename = "type")]
    pub provider_type: Option<String>,
    pub instance_crn: Option<String>,
    pub pin_iam_credentials_secret_id: Option<String>,
    pub private_keystore_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CryptoKeyWire {
    pub id: Option<String>,
    pub label: Option<String>,
    pub allow_generate_key: Option<bool>,
    pub provider: Option<CryptoProviderWire>,
}

impl CryptoKey {
    /// # Errors
    /// - [`Error::UnrecognizedVariant`] for an unknown provider `type`
    /// - [`Error::Codec`] when the provider object carries no `type`
    pub fn decode(kind: &'static str, wire: &CryptoKeyWire) -> Result<Self> {
        let provider = match &wire.provider {
            Some(provider) => Field::Set(decode_provider(kind, provider)?),
            None => Field::Absent,
        };
        Ok(CryptoKey {
            id: wire.id.clone().into(),
            label: wire.label.clone().into(),
            allow_generate_key: wire.allow_generate_key.into(),
            provider,
        })
    }

    /// JSON object with only the set members
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        put_string(&mut out, "id", &self.id);
        put_string(&mut out, "label", &self.label);
        if let Some(allow) = self.allow_generate_key.get() {
            out.insert("allow_generate_key".into(), Value::Bool(*allow));
        }
        if let Some(provider) = self.provider.get() {
            let mut body = Map::new();
            body.insert("type".into(), Value::String(provider.kind().tag().to_string()));
            match provider {
                CryptoKeyProvider::HyperProtectCryptoServices {
                    instance_crn,
                    pin_iam_credentials_secret_id,
                    private_keystore_id,
                } => {
                    put_string(&mut body, "instance_crn", instance_crn);
                    put_string(
                        &mut body,
                        "pin_iam_credentials_secret_id",
                        pin_iam_credentials_secret_id,
                    );
                    put_string(&mut body, "private_keystore_id", private_keystore_id);
                }
            }
            out.insert("provider".into(), Value::Object(body));
        }
        Value::Object(out)
    }
}

fn decode_provider(kind: &'static str, wire: &CryptoProviderWire) -> Result<CryptoKeyProvider> {
    let tag = wire
        .provider_type
        .as_deref()
        .ok_or_else(|| Error::codec(kind, "crypto_key", "provider carries no type"))?;
    match CryptoProviderKind::from_tag(tag)? {
        CryptoProviderKind::HyperProtectCryptoServices => {
            Ok(CryptoKeyProvider::HyperProtectCryptoServices {
                instance_crn: wire.instance_crn.clone().into(),
                pin_iam_credentials_secret_id: wire.pin_iam_credentials_secret_id.clone().into(),
                private_keystore_id: wire.private_keystore_id.clone().into(),
            })
        }
    }
}

fn put_string(out: &mut Map<String, Value>, key: &str, field: &Field<String>) {
    if let Some(value) = field.get() {
        out.insert(key.to_string(), Value::String(value.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KIND: &str = "private_cert_configuration_root_ca";

    fn wire(value: Value) -> CryptoKeyWire {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_hpcs_provider_is_decoded() {
        let key = CryptoKey::decode(
            KIND,
            &wire(json!({
                "label": "root-key",
                "allow_generate_key": true,
                "provider": {
                    "type": "hyper_protect_crypto_services",
                    "instance_crn": "crn:v1:bluemix:public:hs-crypto:us-south:a/1:abc::",
                    "pin_iam_credentials_secret_id": "iam-1",
                    "private_keystore_id": "ks-1"
                }
            })),
        )
        .unwrap();

        assert!(key.id.is_absent());
        let Some(CryptoKeyProvider::HyperProtectCryptoServices {
            private_keystore_id,
            ..
        }) = key.provider.get()
        else {
            panic!("expected an HPCS provider");
        };
        assert_eq!(private_keystore_id.get().map(String::as_str), Some("ks-1"));
        assert_eq!(key.to_value()["provider"]["type"], HPCS_TAG);
    }

    #[test]
    fn test_unknown_provider_type_is_rejected() {
        let err = CryptoKey::decode(
            KIND,
            &wire(json!({"id": "k1", "provider": {"type": "key_protect"}})),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::UnrecognizedVariant { family: "crypto provider", ref tag } if tag == "key_protect"
        ));
    }

    #[test]
    fn test_provider_without_type_is_rejected() {
        let err = CryptoKey::decode(KIND, &wire(json!({"provider": {"instance_crn": "crn"}})))
            .unwrap_err();
        assert!(matches!(err, Error::Codec { field: "crypto_key", .. }));
    }
}

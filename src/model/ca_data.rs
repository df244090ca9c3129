//! Certificate-authority material attached to CA configurations.
//!
//! The wire object is always called `data`; which members are meaningful
//! depends on where the CA is in its signing flow, so the variant is chosen
//! from context and never from the payload itself.

use crate::model::{Field, Sensitive};
use serde::Deserialize;

/// Which CA data variant a configuration read should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaDataShape {
    /// Intermediate CA waiting for an external signature
    PendingCsr,
    /// Signed CA certificate material
    Signed,
}

impl CaDataShape {
    /// Shape for an intermediate CA given its reported `status`
    #[must_use]
    pub fn for_intermediate_status(status: Option<&str>) -> Self {
        match status {
            Some("signing_required" | "signing_pending") => CaDataShape::PendingCsr,
            _ => CaDataShape::Signed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaData {
    PendingCsr {
        csr: Field<String>,
        private_key: Field<Sensitive>,
        private_key_type: Field<String>,
        expiration: Field<i64>,
    },
    Signed {
        certificate: Field<String>,
        issuing_ca: Field<String>,
        ca_chain: Field<Vec<String>>,
        private_key: Field<Sensitive>,
        private_key_type: Field<String>,
        expiration: Field<i64>,
    },
}

/// Superset of every CA data member the remote may send
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaDataWire {
    pub csr: Option<String>,
    pub private_key: Option<String>,
    pub private_key_type: Option<String>,
    pub expiration: Option<i64>,
    pub certificate: Option<String>,
    pub issuing_ca: Option<String>,
    pub ca_chain: Option<Vec<String>>,
}

impl CaData {
    #[must_use]
    pub fn decode(shape: CaDataShape, wire: &CaDataWire) -> Self {
        let private_key = wire.private_key.clone().map(Sensitive::from).into();
        match shape {
            CaDataShape::PendingCsr => CaData::PendingCsr {
                csr: wire.csr.clone().into(),
                private_key,
                private_key_type: wire.private_key_type.clone().into(),
                expiration: wire.expiration.into(),
            },
            CaDataShape::Signed => CaData::Signed {
                certificate: wire.certificate.clone().into(),
                issuing_ca: wire.issuing_ca.clone().into(),
                ca_chain: wire.ca_chain.clone().into(),
                private_key,
                private_key_type: wire.private_key_type.clone().into(),
                expiration: wire.expiration.into(),
            },
        }
    }

    #[must_use]
    pub fn shape(&self) -> CaDataShape {
        match self {
            CaData::PendingCsr { .. } => CaDataShape::PendingCsr,
            CaData::Signed { .. } => CaDataShape::Signed,
        }
    }

    /// The CSR to hand to an external signer, if pending
    #[must_use]
    pub fn csr(&self) -> Option<&str> {
        match self {
            CaData::PendingCsr { csr, .. } => csr.get().map(String::as_str),
            CaData::Signed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_from_status() {
        assert_eq!(
            CaDataShape::for_intermediate_status(Some("signing_required")),
            CaDataShape::PendingCsr
        );
        assert_eq!(
            CaDataShape::for_intermediate_status(Some("signing_pending")),
            CaDataShape::PendingCsr
        );
        assert_eq!(
            CaDataShape::for_intermediate_status(Some("configured")),
            CaDataShape::Signed
        );
        assert_eq!(CaDataShape::for_intermediate_status(None), CaDataShape::Signed);
    }

    #[test]
    fn test_decode_pending_ignores_certificate_members() {
        let wire = CaDataWire {
            csr: Some("-----BEGIN CERTIFICATE REQUEST-----".into()),
            certificate: Some("ignored".into()),
            ..Default::default()
        };
        let data = CaData::decode(CaDataShape::PendingCsr, &wire);
        assert_eq!(data.shape(), CaDataShape::PendingCsr);
        assert_eq!(data.csr(), Some("-----BEGIN CERTIFICATE REQUEST-----"));
    }
}

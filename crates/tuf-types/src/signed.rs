//! The signed envelope and signatures

use crate::encoding::HexBytes;
use crate::key::SigAlgorithm;
use serde::{Deserialize, Serialize};

/// A single signature over a canonical document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(rename = "keyid")]
    pub key_id: String,
    pub method: SigAlgorithm,
    #[serde(rename = "sig")]
    pub signature: HexBytes,
}

/// The envelope wrapping every metadata document on the wire
///
/// `signed` is kept as a generic JSON tree: the bytes that signatures cover
/// are always the canonical re-serialization of this tree, never whatever
/// byte string happened to arrive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signed {
    pub signed: serde_json::Value,
    pub signatures: Vec<Signature>,
}

impl Signed {
    /// Canonical bytes of the inner document — the message that is signed
    /// and verified.
    pub fn canonical_signed(&self) -> crate::Result<Vec<u8>> {
        Ok(tuf_canonical::value_to_canonical_json(&self.signed)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_wire_names() {
        let sig = Signature {
            key_id: "abc".to_string(),
            method: SigAlgorithm::EdDsa,
            signature: HexBytes::from_bytes(&[1, 2]),
        };
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json, r#"{"keyid":"abc","method":"eddsa","sig":"0102"}"#);
    }

    #[test]
    fn test_envelope_roundtrip() {
        let raw = r#"{"signed":{"_type":"root","version":1},"signatures":[]}"#;
        let s: Signed = serde_json::from_str(raw).unwrap();
        assert!(s.signatures.is_empty());
        assert_eq!(s.signed["_type"], "root");
        let back = serde_json::to_string(&s).unwrap();
        let reparsed: Signed = serde_json::from_str(&back).unwrap();
        assert_eq!(s, reparsed);
    }

    #[test]
    fn test_canonical_signed_is_order_independent() {
        let a: Signed =
            serde_json::from_str(r#"{"signed":{"b":1,"a":2},"signatures":[]}"#).unwrap();
        let b: Signed =
            serde_json::from_str(r#"{"signed":{"a":2,"b":1},"signatures":[]}"#).unwrap();
        assert_eq!(
            a.canonical_signed().unwrap(),
            b.canonical_signed().unwrap()
        );
    }
}

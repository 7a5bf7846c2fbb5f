//! SubjectPublicKeyInfo parsing and certificate key extraction
//!
//! `rsa` and `ecdsa` keys carry a DER-encoded SPKI; `rsa-x509` and
//! `ecdsa-x509` carry a PEM-encoded X.509 certificate whose SPKI is
//! extracted at verify time. The verifiers hand aws-lc-rs the raw bit
//! string from the SPKI, which is the encoding its `UnparsedPublicKey`
//! expects (RSAPublicKey DER for RSA, the uncompressed point for EC).

use crate::error::{Error, Result};
use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, RSA_ENCRYPTION, SECP_256_R_1, SECP_384_R_1};
use const_oid::db::rfc8410::ID_ED_25519;
use const_oid::ObjectIdentifier;
use spki::SubjectPublicKeyInfoRef;
use x509_cert::der::{Decode, Encode};
use x509_cert::Certificate;

/// Supported ECDSA curves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcCurve {
    P256,
    P384,
}

impl EcCurve {
    /// Bytes per coordinate: `⌈bitsize/8⌉`
    pub fn coordinate_bytes(&self) -> usize {
        match self {
            EcCurve::P256 => 32,
            EcCurve::P384 => 48,
        }
    }
}

/// The algorithm family a parsed SPKI belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Ed25519,
    Rsa,
    Ec(EcCurve),
}

/// A public key extracted from an SPKI: its family and the raw bit-string
/// bytes
#[derive(Debug, Clone)]
pub struct ParsedKey {
    pub kind: KeyKind,
    pub raw: Vec<u8>,
}

/// Parse a DER-encoded SubjectPublicKeyInfo.
pub fn parse_spki(der: &[u8]) -> Result<ParsedKey> {
    let spki = SubjectPublicKeyInfoRef::try_from(der)
        .map_err(|e| Error::InvalidKey(format!("invalid SPKI: {e}")))?;
    let raw = spki.subject_public_key.raw_bytes().to_vec();

    let oid = spki.algorithm.oid;
    let kind = if oid == RSA_ENCRYPTION {
        KeyKind::Rsa
    } else if oid == ID_ED_25519 {
        KeyKind::Ed25519
    } else if oid == ID_EC_PUBLIC_KEY {
        let params = spki
            .algorithm
            .parameters
            .ok_or_else(|| Error::InvalidKey("EC key without curve parameters".to_string()))?;
        let curve = ObjectIdentifier::from_bytes(params.value())
            .map_err(|e| Error::InvalidKey(format!("invalid EC curve OID: {e}")))?;
        if curve == SECP_256_R_1 {
            KeyKind::Ec(EcCurve::P256)
        } else if curve == SECP_384_R_1 {
            KeyKind::Ec(EcCurve::P384)
        } else {
            return Err(Error::UnsupportedAlgorithm(format!(
                "EC curve {curve}"
            )));
        }
    } else {
        return Err(Error::UnsupportedAlgorithm(format!("key algorithm {oid}")));
    };

    Ok(ParsedKey { kind, raw })
}

/// Extract the DER-encoded SPKI from a PEM-encoded X.509 certificate.
pub fn spki_from_pem_cert(pem_text: &[u8]) -> Result<Vec<u8>> {
    let block = pem::parse(pem_text)
        .map_err(|e| Error::InvalidKey(format!("invalid PEM: {e}")))?;
    if block.tag() != "CERTIFICATE" {
        return Err(Error::InvalidKey(format!(
            "expected CERTIFICATE PEM block, got {}",
            block.tag()
        )));
    }
    let cert = Certificate::from_der(block.contents())
        .map_err(|e| Error::InvalidKey(format!("invalid certificate: {e}")))?;
    cert.tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| Error::InvalidKey(format!("failed to encode SPKI: {e}")))
}

/// Extract a DER-encoded SPKI from a PEM block that is either a
/// `PUBLIC KEY` or a `CERTIFICATE`.
pub fn spki_from_pem(pem_text: &[u8]) -> Result<Vec<u8>> {
    let block = pem::parse(pem_text)
        .map_err(|e| Error::InvalidKey(format!("invalid PEM: {e}")))?;
    match block.tag() {
        "PUBLIC KEY" => Ok(block.contents().to_vec()),
        "CERTIFICATE" => {
            let cert = Certificate::from_der(block.contents())
                .map_err(|e| Error::InvalidKey(format!("invalid certificate: {e}")))?;
            cert.tbs_certificate
                .subject_public_key_info
                .to_der()
                .map_err(|e| Error::InvalidKey(format!("failed to encode SPKI: {e}")))
        }
        other => Err(Error::InvalidKey(format!(
            "expected PUBLIC KEY or CERTIFICATE PEM block, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal Ed25519 SPKI: SEQUENCE { SEQUENCE { OID 1.3.101.112 }, BIT STRING }
    fn ed25519_spki(public: &[u8; 32]) -> Vec<u8> {
        let mut out = vec![
            0x30, 0x2a, // SEQUENCE, 42 bytes
            0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, // AlgorithmIdentifier: id-Ed25519
            0x03, 0x21, 0x00, // BIT STRING, 33 bytes, 0 unused bits
        ];
        out.extend_from_slice(public);
        out
    }

    #[test]
    fn test_parse_ed25519_spki() {
        let public = [7u8; 32];
        let parsed = parse_spki(&ed25519_spki(&public)).unwrap();
        assert_eq!(parsed.kind, KeyKind::Ed25519);
        assert_eq!(parsed.raw, public);
    }

    #[test]
    fn test_parse_garbage_rejected() {
        assert!(matches!(parse_spki(b"not der"), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_pem_wrong_tag_rejected() {
        let block = pem::Pem::new("PRIVATE KEY", vec![1, 2, 3]);
        let text = pem::encode(&block);
        assert!(spki_from_pem(text.as_bytes()).is_err());
        assert!(spki_from_pem_cert(text.as_bytes()).is_err());
    }

    #[test]
    fn test_pem_public_key_passthrough() {
        let spki = ed25519_spki(&[9u8; 32]);
        let block = pem::Pem::new("PUBLIC KEY", spki.clone());
        let text = pem::encode(&block);
        assert_eq!(spki_from_pem(text.as_bytes()).unwrap(), spki);
    }

    #[test]
    fn test_coordinate_bytes() {
        assert_eq!(EcCurve::P256.coordinate_bytes(), 32);
        assert_eq!(EcCurve::P384.coordinate_bytes(), 48);
    }
}

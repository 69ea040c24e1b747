//! The recipients document: fingerprint → wrapped-DEK mapping.

use crate::error::{VaultError, VaultResult};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One recipient's entry: who they are and their copy of the DEK.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecipientRecord {
    /// Human label, e.g. a device or teammate name.
    pub label: String,
    /// Base64 of the recipient's 32-byte Curve25519 public key.
    #[serde(rename = "publicKey")]
    pub public_key: String,
    /// Base64 of the sealed DEK (ephemeral key ∥ nonce ∥ ciphertext+tag).
    /// Rewritten on every DEK rotation.
    #[serde(rename = "wrappedDEK")]
    pub wrapped_dek: String,
    /// ISO-8601 UTC timestamp of when this recipient was added.
    #[serde(rename = "addedAt")]
    pub added_at: String,
}

impl RecipientRecord {
    /// Decodes this record's stored public key.
    ///
    /// A record that fails to decode means the document was edited by
    /// hand or corrupted, so this is an integrity failure.
    pub fn decode_public_key(&self) -> VaultResult<[u8; 32]> {
        decode_key_b64(&self.public_key).map_err(|_| VaultError::Integrity)
    }

    /// Decodes this record's wrapped DEK.
    pub fn decode_wrapped_dek(&self) -> VaultResult<Vec<u8>> {
        B64.decode(&self.wrapped_dek).map_err(|_| VaultError::Integrity)
    }
}

/// The per-vault recipients document.
///
/// `dek_version` strictly increases on every rotation (content mutation or
/// revoke) and never on a share. The map is keyed by fingerprint; BTreeMap
/// keeps serialization fingerprint-sorted so version-control diffs stay
/// minimal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecipientsDoc {
    pub dek_version: u64,
    pub recipients: BTreeMap<String, RecipientRecord>,
}

impl RecipientsDoc {
    /// A fresh document at version 1 with a single recipient.
    pub fn initial(fingerprint: String, record: RecipientRecord) -> Self {
        let mut recipients = BTreeMap::new();
        recipients.insert(fingerprint, record);
        Self { dek_version: 1, recipients }
    }

    /// Parses a document; any malformation is an integrity failure.
    pub fn from_bytes(bytes: &[u8]) -> VaultResult<Self> {
        let doc: Self = serde_json::from_slice(bytes)?;
        if doc.dek_version == 0 {
            return Err(VaultError::Integrity);
        }
        Ok(doc)
    }

    /// Canonical serialization: pretty JSON, fingerprint-sorted keys.
    pub fn to_canonical_bytes(&self) -> VaultResult<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Decodes a user-supplied base64 public key, insisting on exactly 32 bytes.
pub fn decode_public_key(b64: &str) -> VaultResult<[u8; 32]> {
    decode_key_b64(b64).map_err(|_| VaultError::InvalidPublicKey)
}

fn decode_key_b64(b64: &str) -> Result<[u8; 32], ()> {
    let bytes = B64.decode(b64.trim()).map_err(|_| ())?;
    if bytes.len() != 32 {
        return Err(());
    }
    let mut key = [0u8; 32];
    key.copy_from_slice(&bytes);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: &str) -> RecipientRecord {
        RecipientRecord {
            label: label.to_string(),
            public_key: B64.encode([1u8; 32]),
            wrapped_dek: B64.encode([2u8; 104]),
            added_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn serialization_is_fingerprint_sorted() {
        let mut doc = RecipientsDoc::initial("ffff000011112222".to_string(), record("z"));
        doc.recipients.insert("0000aaaabbbbcccc".to_string(), record("a"));
        doc.recipients.insert("8888999900001111".to_string(), record("m"));

        let bytes = doc.to_canonical_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let a = text.find("0000aaaabbbbcccc").unwrap();
        let m = text.find("8888999900001111").unwrap();
        let z = text.find("ffff000011112222").unwrap();
        assert!(a < m && m < z);
    }

    #[test]
    fn canonical_roundtrip() {
        let doc = RecipientsDoc::initial("aabbccdd00112233".to_string(), record("laptop"));
        let bytes = doc.to_canonical_bytes().unwrap();
        let parsed = RecipientsDoc::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.dek_version, 1);
        assert_eq!(parsed.recipients.len(), 1);
        assert_eq!(parsed.recipients["aabbccdd00112233"].label, "laptop");
    }

    #[test]
    fn zero_version_rejected() {
        let json = br#"{"dek_version":0,"recipients":{}}"#;
        assert!(matches!(
            RecipientsDoc::from_bytes(json),
            Err(VaultError::Integrity)
        ));
    }

    #[test]
    fn malformed_document_is_integrity_failure() {
        assert!(matches!(
            RecipientsDoc::from_bytes(b"not json"),
            Err(VaultError::Integrity)
        ));
    }

    #[test]
    fn public_key_decode_enforces_length() {
        assert!(decode_public_key(&B64.encode([0u8; 32])).is_ok());
        assert!(matches!(
            decode_public_key(&B64.encode([0u8; 31])),
            Err(VaultError::InvalidPublicKey)
        ));
        assert!(matches!(
            decode_public_key(&B64.encode([0u8; 33])),
            Err(VaultError::InvalidPublicKey)
        ));
        assert!(matches!(
            decode_public_key("not base64 !!!"),
            Err(VaultError::InvalidPublicKey)
        ));
    }
}

//! Authenticated symmetric encryption (AES-256-GCM).
//!
//! Wire layout: `IV (12) ∥ ciphertext ∥ auth tag (16)`. One fresh random
//! IV per encryption; under 2^32 encryptions per key the collision
//! probability is negligible.

use crate::error::{CryptoError, CryptoResult};
use crate::key::DataKey;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;

/// AES-GCM IV length in bytes.
pub const NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_SIZE: usize = 16;

/// Encrypts `plaintext` under `key`, returning `IV ∥ ciphertext ∥ tag`.
///
/// Fails only if the OS randomness source does.
pub fn encrypt(key: &DataKey, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let mut iv = [0u8; NONCE_SIZE];
    rand::rngs::OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|e| CryptoError::Random(e.to_string()))?;

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypts `IV ∥ ciphertext ∥ tag` produced by [`encrypt`].
///
/// Fails with [`CryptoError::Integrity`] when the input is shorter than
/// IV + tag or when the tag does not verify. Wrong key and tampered data
/// are indistinguishable.
pub fn decrypt(key: &DataKey, bytes: &[u8]) -> CryptoResult<Vec<u8>> {
    if bytes.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::Integrity);
    }

    let (iv, ciphertext) = bytes.split_at(NONCE_SIZE);
    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::Integrity)?;
    cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| CryptoError::Integrity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let key = DataKey::generate().unwrap();
        let plaintext = b"A=1\nB=2\n";
        let encrypted = encrypt(&key, plaintext).unwrap();
        assert_eq!(decrypt(&key, &encrypted).unwrap(), plaintext);
    }

    #[test]
    fn roundtrip_empty_plaintext() {
        let key = DataKey::generate().unwrap();
        let encrypted = encrypt(&key, b"").unwrap();
        assert_eq!(encrypted.len(), NONCE_SIZE + TAG_SIZE);
        assert_eq!(decrypt(&key, &encrypted).unwrap(), b"");
    }

    #[test]
    fn two_encryptions_differ() {
        let key = DataKey::generate().unwrap();
        let e1 = encrypt(&key, b"same plaintext").unwrap();
        let e2 = encrypt(&key, b"same plaintext").unwrap();
        assert_ne!(e1, e2);
    }

    #[test]
    fn wrong_key_fails_integrity() {
        let key = DataKey::generate().unwrap();
        let other = DataKey::generate().unwrap();
        let encrypted = encrypt(&key, b"secret").unwrap();
        assert!(matches!(
            decrypt(&other, &encrypted),
            Err(CryptoError::Integrity)
        ));
    }

    #[test]
    fn short_input_fails_integrity() {
        let key = DataKey::generate().unwrap();
        for len in 0..(NONCE_SIZE + TAG_SIZE) {
            assert!(matches!(
                decrypt(&key, &vec![0u8; len]),
                Err(CryptoError::Integrity)
            ));
        }
    }

    #[test]
    fn flipped_byte_fails_integrity() {
        let key = DataKey::generate().unwrap();
        let mut encrypted = encrypt(&key, b"some payload bytes").unwrap();
        let i = encrypted.len() / 2;
        encrypted[i] ^= 0xFF;
        assert!(matches!(
            decrypt(&key, &encrypted),
            Err(CryptoError::Integrity)
        ));
    }
}

//! Anonymous sealed boxes for wrapping DEKs.
//!
//! X25519 key exchange + XSalsa20-Poly1305. A fresh ephemeral keypair is
//! generated per seal and its public half prepended to the output, so the
//! recipient can decrypt without knowing the sender. Compromise of one
//! sealed box does not compromise others.
//!
//! Wire layout: `ephemeral public (32) ∥ nonce (24) ∥ ciphertext + tag`.

use crate::error::{CryptoError, CryptoResult};
use crypto_box::aead::Aead;
use crypto_box::SalsaBox;
pub use crypto_box::{PublicKey, SecretKey};
use rand::RngCore;

const EPHEMERAL_PUBLIC_SIZE: usize = 32;
const SEAL_NONCE_SIZE: usize = 24;
const POLY1305_TAG_SIZE: usize = 16;

/// Fixed byte overhead of a sealed box over its message.
pub const SEALED_OVERHEAD: usize = EPHEMERAL_PUBLIC_SIZE + SEAL_NONCE_SIZE + POLY1305_TAG_SIZE;

/// X25519 device keypair.
///
/// The secret key implements `ZeroizeOnDrop` automatically (from crypto_box).
pub struct DeviceKeyPair {
    pub secret: SecretKey,
    pub public: PublicKey,
}

impl DeviceKeyPair {
    /// Generates a new keypair from the OS entropy source.
    pub fn generate() -> Self {
        let secret = SecretKey::generate(&mut rand::rngs::OsRng);
        let public = secret.public_key();
        Self { secret, public }
    }

    /// Reconstructs a keypair from raw secret key bytes.
    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        let secret = SecretKey::from(bytes);
        let public = secret.public_key();
        Self { secret, public }
    }

    /// Returns the public key as a raw 32-byte array.
    pub fn public_bytes(&self) -> [u8; 32] {
        *self.public.as_bytes()
    }

    /// Returns the secret key as a raw 32-byte array.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret.to_bytes()
    }
}

/// Seals `message` for `recipient_pk` with a fresh ephemeral keypair.
pub fn seal(message: &[u8], recipient_pk: &PublicKey) -> CryptoResult<Vec<u8>> {
    let ephemeral = SecretKey::generate(&mut rand::rngs::OsRng);
    let ephemeral_pk = ephemeral.public_key();

    let salsa_box = SalsaBox::new(recipient_pk, &ephemeral);

    let mut nonce = [0u8; SEAL_NONCE_SIZE];
    rand::rngs::OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| CryptoError::Random(e.to_string()))?;

    let ciphertext = salsa_box
        .encrypt(crypto_box::Nonce::from_slice(&nonce), message)
        .map_err(|e| CryptoError::Encryption(format!("seal failed: {e}")))?;

    let mut out = Vec::with_capacity(SEALED_OVERHEAD + message.len());
    out.extend_from_slice(ephemeral_pk.as_bytes());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Opens a sealed box with the recipient's secret key.
///
/// Fails with [`CryptoError::Integrity`] on truncation, tampering, or a
/// non-matching key; the three cases are indistinguishable.
pub fn open(bytes: &[u8], recipient_sk: &SecretKey) -> CryptoResult<Vec<u8>> {
    if bytes.len() < SEALED_OVERHEAD {
        return Err(CryptoError::Integrity);
    }

    let mut ephemeral = [0u8; EPHEMERAL_PUBLIC_SIZE];
    ephemeral.copy_from_slice(&bytes[..EPHEMERAL_PUBLIC_SIZE]);
    let ephemeral_pk = PublicKey::from(ephemeral);

    let nonce = &bytes[EPHEMERAL_PUBLIC_SIZE..EPHEMERAL_PUBLIC_SIZE + SEAL_NONCE_SIZE];
    let ciphertext = &bytes[EPHEMERAL_PUBLIC_SIZE + SEAL_NONCE_SIZE..];

    let salsa_box = SalsaBox::new(&ephemeral_pk, recipient_sk);
    salsa_box
        .decrypt(crypto_box::Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::Integrity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sealed_layout_overhead() {
        let kp = DeviceKeyPair::generate();
        let sealed = seal(&[0u8; 32], &kp.public).unwrap();
        // 32-byte DEK nominal: 32 + 24 + 32 + 16 = 104 bytes total
        assert_eq!(sealed.len(), SEALED_OVERHEAD + 32);
    }
}

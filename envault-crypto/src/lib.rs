//! Cryptographic primitives for env-vault.
//!
//! Provides the three stateless operations the vault is built from:
//! - AES-256-GCM authenticated encryption for payloads and the private key
//! - Anonymous sealed boxes (X25519 + XSalsa20-Poly1305) for wrapping DEKs
//! - scrypt key derivation from the identity password
//!
//! # Architecture
//!
//! The vault uses a three-tier key hierarchy:
//!
//! 1. **Derived key**: produced from the user's password with scrypt.
//!    Never stored - derived again on every unlock.
//!
//! 2. **Device key**: a long-term Curve25519 keypair per device. The
//!    private scalar is persisted only encrypted under the derived key.
//!
//! 3. **DEK**: a random key per vault, rotated on every content change.
//!    Each recipient holds a copy sealed to their device public key.
//!
//! This architecture allows:
//! - Changing vault content without recipients re-entering passwords
//! - Sharing a vault by sealing just the DEK for the new device
//! - Revocation by rotating the DEK away from the removed device

mod aead;
mod error;
mod fingerprint;
mod key;
pub mod sealbox;

pub use aead::{decrypt, encrypt, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use fingerprint::{fingerprint, FINGERPRINT_LEN};
pub use key::{derive_key, DataKey, KdfParams, Salt, KEY_SIZE, SALT_SIZE};
pub use sealbox::{open, seal, DeviceKeyPair, SEALED_OVERHEAD};

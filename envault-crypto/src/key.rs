//! Key material: symmetric keys, KDF salts, and scrypt derivation.

use crate::error::{CryptoError, CryptoResult};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Symmetric key length in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// KDF salt length in bytes.
pub const SALT_SIZE: usize = 16;

/// A 32-byte symmetric key, zeroized on drop.
///
/// Used both for password-derived keys and for per-vault DEKs; the two
/// roles never mix because derived keys only ever encrypt the device
/// private key and DEKs only ever encrypt vault payloads.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DataKey([u8; KEY_SIZE]);

impl DataKey {
    /// Generates a fresh random key from the OS entropy source.
    pub fn generate() -> CryptoResult<Self> {
        let mut bytes = [0u8; KEY_SIZE];
        rand::rngs::OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::Random(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Reconstructs a key from a slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for DataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key bytes must never reach logs
        f.write_str("DataKey(..)")
    }
}

/// A 16-byte KDF salt. Created once per identity and immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    pub fn random() -> CryptoResult<Self> {
        let mut bytes = [0u8; SALT_SIZE];
        rand::rngs::OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::Random(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != SALT_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: SALT_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; SALT_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

/// scrypt cost parameters.
///
/// New identities always derive with [`KdfParams::current`]. The legacy set
/// exists read-only so identities created by old releases keep unlocking;
/// decryption tries current first, then legacy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KdfParams {
    /// log2 of the scrypt N parameter.
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

impl KdfParams {
    /// Current parameter set: N = 2^17, r = 8, p = 1.
    pub fn current() -> Self {
        Self { log_n: 17, r: 8, p: 1 }
    }

    /// Legacy parameter set: N = 2^14, r = 8, p = 1. Read-only, kept for
    /// unlocking identities created before the cost bump.
    pub fn legacy() -> Self {
        Self { log_n: 14, r: 8, p: 1 }
    }

    /// Marker string recorded in the device config, e.g. `scrypt-17-8-1`.
    pub fn marker(&self) -> String {
        format!("scrypt-{}-{}-{}", self.log_n, self.r, self.p)
    }
}

/// Derives a 32-byte key from a password and salt with scrypt.
///
/// Deterministic for identical inputs; distinct salts give distinct keys.
/// Intentionally expensive at current parameters (seconds of CPU).
pub fn derive_key(password: &str, salt: &Salt, params: &KdfParams) -> CryptoResult<DataKey> {
    let scrypt_params = scrypt::Params::new(params.log_n, params.r, params.p, KEY_SIZE)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    let mut output = [0u8; KEY_SIZE];
    scrypt::scrypt(password.as_bytes(), salt.as_bytes(), &scrypt_params, &mut output)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    Ok(DataKey::from_bytes(output))
}

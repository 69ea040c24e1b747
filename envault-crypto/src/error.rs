//! Primitive-layer error types.

use thiserror::Error;

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
///
/// Every authentication failure maps to [`CryptoError::Integrity`]. The
/// message deliberately does not say whether the key was wrong or the data
/// was tampered with, so callers cannot be used as an oracle.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("integrity check failed")]
    Integrity,

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("system randomness unavailable: {0}")]
    Random(String),
}

//! The vault error taxonomy.
//!
//! Cryptographic failures collapse to two externally visible kinds:
//! [`VaultError::BadCredentials`] for anything password-related and
//! [`VaultError::Integrity`] for anything data-related. No message ever
//! distinguishes a wrong key from tampered data.

use envault_crypto::CryptoError;
use envault_identity::IdentityError;
use envault_storage::StorageError;
use thiserror::Error;

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Errors surfaced by the vault engine.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("no identity found; run init first")]
    NoIdentity,

    #[error("identity already initialized")]
    AlreadyInitialized,

    #[error("password verification failed")]
    BadCredentials,

    #[error("vault integrity check failed")]
    Integrity,

    #[error("this device is not a recipient of vault {0:?}")]
    NoAccess(String),

    #[error("no recipient with fingerprint {0}")]
    NotARecipient(String),

    #[error("cannot revoke this device's own access")]
    SelfRevoke,

    #[error("invalid vault name: {0:?}")]
    InvalidName(String),

    #[error("public key must be 32 base64-encoded bytes")]
    InvalidPublicKey,

    #[error("vault {0:?} already exists")]
    AlreadyExists(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<CryptoError> for VaultError {
    fn from(e: CryptoError) -> Self {
        match e {
            // OS randomness failure is an environment problem, not data
            CryptoError::Random(msg) => VaultError::Io(std::io::Error::other(msg)),
            _ => VaultError::Integrity,
        }
    }
}

impl From<IdentityError> for VaultError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::NoIdentity => VaultError::NoIdentity,
            IdentityError::AlreadyInitialized => VaultError::AlreadyInitialized,
            IdentityError::PasswordTooShort | IdentityError::BadCredentials => {
                VaultError::BadCredentials
            }
            IdentityError::Corrupt(_) => VaultError::Integrity,
            IdentityError::Crypto(inner) => inner.into(),
            IdentityError::Io(inner) => VaultError::Io(inner),
        }
    }
}

impl From<StorageError> for VaultError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::InvalidName(name) => VaultError::InvalidName(name),
            StorageError::Io(inner) => VaultError::Io(inner),
        }
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(_: serde_json::Error) -> Self {
        // A recipients document that doesn't parse is tampered or truncated
        VaultError::Integrity
    }
}

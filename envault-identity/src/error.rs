//! Identity error types.

use thiserror::Error;

/// Result type for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Errors that can occur in the identity store.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no identity found; run init first")]
    NoIdentity,

    #[error("identity already initialized")]
    AlreadyInitialized,

    #[error("password too short (min 8 characters)")]
    PasswordTooShort,

    #[error("password verification failed")]
    BadCredentials,

    #[error("identity files corrupt: {0}")]
    Corrupt(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] envault_crypto::CryptoError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

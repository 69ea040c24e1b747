//! Device identity store for env-vault.
//!
//! One identity per host user, rooted at `~/.env-vault` by default:
//!
//! ```text
//! <root>/config.json           device config (label, fingerprint, created)
//! <root>/identity/private.key  Curve25519 scalar, sealed under the password
//! <root>/identity/public.key   32 raw bytes, stored in the clear
//! <root>/identity/salt         16 raw bytes, fixed at init
//! ```
//!
//! The private key never touches disk in the clear. Unlock derives the
//! password key with the current scrypt parameters first and falls back to
//! the legacy set, surfacing the fallback so callers can recommend an
//! upgrade.

mod config;
mod error;
mod store;

pub use config::DeviceConfig;
pub use error::{IdentityError, IdentityResult};
pub use store::{IdentityStore, KdfGeneration, UnlockedIdentity};

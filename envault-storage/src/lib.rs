//! On-disk artifact storage for env-vault.
//!
//! Abstracts the two physical vault layouts behind one interface:
//! the central `<identity root>/repos/<name>/` backend and the per-project
//! `./.env-vault/` backend. Every write is atomic (sibling temp file,
//! fsync, rename) and mode-restricted (0700 directories, 0600 files).
//!
//! Encrypted artifacts are opaque bytes at this layer; their formats are
//! owned by the vault engine.

pub mod fsutil;
mod artifacts;
mod error;
mod names;

pub use artifacts::{
    list_central, ArtifactStore, LOCAL_DIR, META_FILE, PAYLOAD_FILE, RECIPIENTS_FILE, REPOS_DIR,
};
pub use error::{StorageError, StorageResult};
pub use names::{is_valid_name, validate_name};

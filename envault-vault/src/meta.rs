//! Optional vault metadata.

use serde::{Deserialize, Serialize};

/// Sidecar metadata, never required for decryption.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultMeta {
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

//! Device configuration record.

use serde::{Deserialize, Serialize};

/// Per-device config, written once at init and read-only afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    /// ISO-8601 UTC timestamp of identity creation.
    pub created_at: String,
    /// Human-chosen device label, used as the default recipient label.
    pub device_label: String,
    /// Fingerprint of the device public key.
    pub fingerprint: String,
    /// KDF parameter marker, e.g. `scrypt-17-8-1`. Informational only;
    /// unlock never trusts it and always tries both parameter sets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf: Option<String>,
}

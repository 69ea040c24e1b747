//! Identity persistence and the password unlock procedure.

use crate::config::DeviceConfig;
use crate::error::{IdentityError, IdentityResult};
use chrono::{SecondsFormat, Utc};
use envault_crypto::sealbox::DeviceKeyPair;
use envault_crypto::{decrypt, derive_key, encrypt, fingerprint, KdfParams, Salt};
use envault_storage::fsutil;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CONFIG_FILE: &str = "config.json";
const IDENTITY_DIR: &str = "identity";
const PRIVATE_KEY_FILE: &str = "private.key";
const PUBLIC_KEY_FILE: &str = "public.key";
const SALT_FILE: &str = "salt";

/// Minimum password length in code points.
const MIN_PASSWORD_CHARS: usize = 8;

/// Which scrypt parameter set succeeded during unlock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KdfGeneration {
    Current,
    /// The identity was created before the cost bump. Unlocking works but
    /// callers should recommend re-initializing under current parameters.
    Legacy,
}

/// A successfully unlocked identity. Lives only for the current operation.
pub struct UnlockedIdentity {
    pub keypair: DeviceKeyPair,
    pub kdf: KdfGeneration,
}

/// The on-disk identity store. Exclusively owns identity material.
pub struct IdentityStore {
    root: PathBuf,
}

impl IdentityStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The per-user default root, `~/.env-vault`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".env-vault"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether identity files exist under this root.
    pub fn exists(&self) -> bool {
        self.identity_dir().join(PRIVATE_KEY_FILE).is_file()
    }

    /// Creates the device identity: keypair, salt, sealed private key,
    /// public key, and config, all with restricted modes.
    pub fn initialize(&self, password: &str, device_label: &str) -> IdentityResult<DeviceConfig> {
        if self.exists() {
            return Err(IdentityError::AlreadyInitialized);
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(IdentityError::PasswordTooShort);
        }

        let keypair = DeviceKeyPair::generate();
        let salt = Salt::random()?;
        let params = KdfParams::current();
        let derived = derive_key(password, &salt, &params)?;
        let sealed = encrypt(&derived, &keypair.secret_bytes())?;

        fsutil::ensure_dir(&self.root)?;
        fsutil::ensure_dir(&self.identity_dir())?;

        fsutil::atomic_write(&self.identity_dir().join(PRIVATE_KEY_FILE), &sealed)?;
        fsutil::atomic_write(&self.identity_dir().join(PUBLIC_KEY_FILE), &keypair.public_bytes())?;
        fsutil::atomic_write(&self.identity_dir().join(SALT_FILE), salt.as_bytes())?;

        let config = DeviceConfig {
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            device_label: device_label.to_string(),
            fingerprint: fingerprint(&keypair.public_bytes()),
            kdf: Some(params.marker()),
        };
        let config_json = serde_json::to_vec_pretty(&config)
            .map_err(|e| IdentityError::Corrupt(e.to_string()))?;
        fsutil::atomic_write(&self.root.join(CONFIG_FILE), &config_json)?;

        debug!("initialized identity {} ({})", config.fingerprint, device_label);
        Ok(config)
    }

    /// Unseals the private key with the password.
    ///
    /// Tries current scrypt parameters, then legacy. Every failure mode
    /// collapses to [`IdentityError::BadCredentials`] so a caller cannot
    /// distinguish a wrong password from tampered identity files. Never
    /// writes.
    pub fn unlock(&self, password: &str) -> IdentityResult<UnlockedIdentity> {
        let salt_bytes = fsutil::read_optional(&self.identity_dir().join(SALT_FILE))?
            .ok_or(IdentityError::NoIdentity)?;
        let sealed = fsutil::read_optional(&self.identity_dir().join(PRIVATE_KEY_FILE))?
            .ok_or(IdentityError::NoIdentity)?;
        let salt = Salt::from_slice(&salt_bytes)
            .map_err(|_| IdentityError::Corrupt("bad salt length".to_string()))?;

        for (params, generation) in [
            (KdfParams::current(), KdfGeneration::Current),
            (KdfParams::legacy(), KdfGeneration::Legacy),
        ] {
            let derived = derive_key(password, &salt, &params)?;
            if let Ok(secret) = decrypt(&derived, &sealed) {
                if secret.len() != 32 {
                    return Err(IdentityError::BadCredentials);
                }
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(&secret);
                let keypair = DeviceKeyPair::from_secret_bytes(bytes);

                if generation == KdfGeneration::Legacy {
                    warn!("identity uses legacy KDF parameters; re-init recommended");
                }
                return Ok(UnlockedIdentity { keypair, kdf: generation });
            }
        }

        Err(IdentityError::BadCredentials)
    }

    /// Reads the stored public key (unauthenticated).
    pub fn public_key(&self) -> IdentityResult<[u8; 32]> {
        let bytes = fsutil::read_optional(&self.identity_dir().join(PUBLIC_KEY_FILE))?
            .ok_or(IdentityError::NoIdentity)?;
        if bytes.len() != 32 {
            return Err(IdentityError::Corrupt("bad public key length".to_string()));
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        Ok(key)
    }

    /// Fingerprint of the stored public key (unauthenticated).
    pub fn fingerprint(&self) -> IdentityResult<String> {
        Ok(fingerprint(&self.public_key()?))
    }

    /// Reads the device config (unauthenticated).
    pub fn config(&self) -> IdentityResult<DeviceConfig> {
        let bytes = fsutil::read_optional(&self.root.join(CONFIG_FILE))?
            .ok_or(IdentityError::NoIdentity)?;
        serde_json::from_slice(&bytes).map_err(|e| IdentityError::Corrupt(e.to_string()))
    }

    /// Deletes identity files (for reset). Vault artifacts stay put; they
    /// become undecryptable until a new identity is shared into them.
    pub fn remove(&self) -> IdentityResult<()> {
        let identity_dir = self.identity_dir();
        if identity_dir.is_dir() {
            fs::remove_dir_all(&identity_dir)?;
        }
        let config = self.root.join(CONFIG_FILE);
        if config.is_file() {
            fs::remove_file(&config)?;
        }
        Ok(())
    }

    fn identity_dir(&self) -> PathBuf {
        self.root.join(IDENTITY_DIR)
    }
}

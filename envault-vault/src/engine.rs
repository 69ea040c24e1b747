//! The DEK lifecycle engine.
//!
//! Every mutating operation unlocks the identity, locates the caller's
//! wrapped DEK by fingerprint, and unwraps it before acting. Writes go
//! payload-before-recipients: a crash between the two renames leaves a
//! vault whose next decrypt fails the integrity check, which is the
//! self-detecting half of the two possible inconsistency windows.

use crate::error::{VaultError, VaultResult};
use crate::meta::VaultMeta;
use crate::recipients::{decode_public_key, RecipientRecord, RecipientsDoc};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use chrono::{SecondsFormat, Utc};
use envault_crypto::sealbox::{self, PublicKey};
use envault_crypto::{decrypt, encrypt, fingerprint, DataKey};
use envault_identity::{IdentityStore, UnlockedIdentity};
use envault_storage::ArtifactStore;
use tracing::info;

/// Result of a share: either a new recipient or an idempotent no-op.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareOutcome {
    Added { fingerprint: String, label: String },
    /// The fingerprint was already present; nothing changed, including
    /// `dek_version`.
    AlreadyShared { fingerprint: String, label: String },
}

/// Read-only view over the recipients document.
#[derive(Clone, Debug)]
pub struct RecipientsView {
    pub dek_version: u64,
    pub entries: Vec<RecipientEntry>,
}

#[derive(Clone, Debug)]
pub struct RecipientEntry {
    pub fingerprint: String,
    pub label: String,
    pub public_key: String,
    pub added_at: String,
    pub is_caller: bool,
}

/// Executes vault protocols over one artifact store.
///
/// Borrows the identity store; holds no cross-call state beyond what is
/// persisted on disk.
pub struct VaultEngine<'a> {
    identity: &'a IdentityStore,
    store: ArtifactStore,
}

impl<'a> VaultEngine<'a> {
    pub fn new(identity: &'a IdentityStore, store: ArtifactStore) -> Self {
        Self { identity, store }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Creates the vault with a fresh DEK and the caller as sole recipient
    /// at `dek_version = 1`.
    ///
    /// Fails with [`VaultError::AlreadyExists`] when a payload is present
    /// and `overwrite` was not consented to.
    pub fn init_vault(&self, plaintext: &[u8], overwrite: bool) -> VaultResult<()> {
        if !self.identity.exists() {
            return Err(VaultError::NoIdentity);
        }
        if self.store.payload_exists() && !overwrite {
            return Err(VaultError::AlreadyExists(self.store.display_name().to_string()));
        }

        let public = self.identity.public_key()?;
        let config = self.identity.config()?;
        let caller_fp = fingerprint(&public);

        let dek = DataKey::generate()?;
        let payload = encrypt(&dek, plaintext)?;
        let record = RecipientRecord {
            label: config.device_label,
            public_key: B64.encode(public),
            wrapped_dek: wrap_dek(&dek, public)?,
            added_at: now(),
        };
        let doc = RecipientsDoc::initial(caller_fp, record);

        self.store.save_payload(&payload)?;
        self.store.save_recipients(&doc.to_canonical_bytes()?)?;
        self.write_meta()?;

        info!("initialized vault {}", self.store.display_name());
        Ok(())
    }

    /// Replaces the vault content under a fresh DEK.
    ///
    /// The new DEK is re-wrapped for every existing recipient and
    /// `dek_version` is bumped, so a revoked party holding an old wrapped
    /// DEK cannot read anything written after their removal. Behaves like
    /// [`Self::init_vault`] when the vault does not exist yet.
    pub fn put(&self, password: &str, plaintext: &[u8]) -> VaultResult<()> {
        if !self.store.payload_exists() {
            return self.init_vault(plaintext, true);
        }
        let unlocked = self.identity.unlock(password)?;
        let mut doc = self.load_doc()?;
        self.rotate_and_write(&unlocked, &mut doc, plaintext)
    }

    /// Decrypts and returns the vault content. Never writes.
    pub fn get(&self, password: &str) -> VaultResult<Vec<u8>> {
        let unlocked = self.identity.unlock(password)?;
        self.decrypt_with(&unlocked)
    }

    /// Adds a recipient by wrapping the current DEK for their public key.
    ///
    /// Idempotent on an already-present fingerprint. Sharing widens the
    /// readership of the same DEK; `dek_version` is unchanged.
    pub fn share(
        &self,
        password: &str,
        public_key_b64: &str,
        label: Option<&str>,
    ) -> VaultResult<ShareOutcome> {
        let new_pk = decode_public_key(public_key_b64)?;
        let new_fp = fingerprint(&new_pk);

        let mut doc = self.load_doc()?;
        if let Some(existing) = doc.recipients.get(&new_fp) {
            return Ok(ShareOutcome::AlreadyShared {
                fingerprint: new_fp,
                label: existing.label.clone(),
            });
        }

        let unlocked = self.identity.unlock(password)?;
        let dek = self.unwrap_caller_dek(&unlocked, &doc)?;

        let label = label
            .map(str::to_string)
            .unwrap_or_else(|| format!("device-{}", &new_fp[..6]));
        doc.recipients.insert(
            new_fp.clone(),
            RecipientRecord {
                label: label.clone(),
                public_key: B64.encode(new_pk),
                wrapped_dek: wrap_dek(&dek, new_pk)?,
                added_at: now(),
            },
        );

        self.store.save_recipients(&doc.to_canonical_bytes()?)?;
        info!(
            "shared vault {} with {new_fp} ({label})",
            self.store.display_name()
        );
        Ok(ShareOutcome::Added { fingerprint: new_fp, label })
    }

    /// Removes a recipient and rotates the DEK away from them.
    pub fn revoke(&self, password: &str, target_fp: &str) -> VaultResult<()> {
        if target_fp == self.identity.fingerprint()? {
            return Err(VaultError::SelfRevoke);
        }

        let mut doc = self.load_doc()?;
        if !doc.recipients.contains_key(target_fp) {
            return Err(VaultError::NotARecipient(target_fp.to_string()));
        }

        let unlocked = self.identity.unlock(password)?;
        let old_dek = self.unwrap_caller_dek(&unlocked, &doc)?;
        let payload = self
            .store
            .load_payload()?
            .ok_or(VaultError::Integrity)?;
        let plaintext = decrypt(&old_dek, &payload)?;

        doc.recipients.remove(target_fp);
        self.rotate_and_write(&unlocked, &mut doc, &plaintext)?;
        info!(
            "revoked {target_fp} from vault {}",
            self.store.display_name()
        );
        Ok(())
    }

    /// Applies `apply` to the decrypted content; writes only on a net
    /// change. Returns whether anything was written.
    pub fn edit<F>(&self, password: &str, apply: F) -> VaultResult<bool>
    where
        F: FnOnce(Vec<u8>) -> VaultResult<Vec<u8>>,
    {
        let unlocked = self.identity.unlock(password)?;
        let current = self.decrypt_with(&unlocked)?;
        let updated = apply(current.clone())?;
        if updated == current {
            return Ok(false);
        }
        let mut doc = self.load_doc()?;
        self.rotate_and_write(&unlocked, &mut doc, &updated)?;
        Ok(true)
    }

    /// Pure read of the recipients document.
    pub fn recipients(&self) -> VaultResult<RecipientsView> {
        let doc = self.load_doc()?;
        let caller_fp = self.identity.fingerprint().ok();

        let entries = doc
            .recipients
            .iter()
            .map(|(fp, rec)| RecipientEntry {
                fingerprint: fp.clone(),
                label: rec.label.clone(),
                public_key: rec.public_key.clone(),
                added_at: rec.added_at.clone(),
                is_caller: caller_fp.as_deref() == Some(fp.as_str()),
            })
            .collect();

        Ok(RecipientsView { dek_version: doc.dek_version, entries })
    }

    /// Re-encrypts `plaintext` under a fresh DEK, re-wraps it for every
    /// recipient in `doc`, bumps the version, and writes payload first.
    fn rotate_and_write(
        &self,
        unlocked: &UnlockedIdentity,
        doc: &mut RecipientsDoc,
        plaintext: &[u8],
    ) -> VaultResult<()> {
        // The caller's current wrapped DEK must unwrap before anything is
        // replaced; a caller whose record cannot produce the DEK holds a
        // stale or forged document.
        let _ = self.unwrap_caller_dek(unlocked, doc)?;

        let new_dek = DataKey::generate()?;
        let payload = encrypt(&new_dek, plaintext)?;
        for record in doc.recipients.values_mut() {
            let pk = record.decode_public_key()?;
            record.wrapped_dek = wrap_dek(&new_dek, pk)?;
        }
        doc.dek_version += 1;

        self.store.save_payload(&payload)?;
        self.store.save_recipients(&doc.to_canonical_bytes()?)?;
        self.write_meta()?;

        info!(
            "rotated vault {} to dek_version {}",
            self.store.display_name(),
            doc.dek_version
        );
        Ok(())
    }

    fn decrypt_with(&self, unlocked: &UnlockedIdentity) -> VaultResult<Vec<u8>> {
        let doc = self.load_doc()?;
        let dek = self.unwrap_caller_dek(unlocked, &doc)?;
        let payload = self
            .store
            .load_payload()?
            .ok_or_else(|| VaultError::NoAccess(self.store.display_name().to_string()))?;
        Ok(decrypt(&dek, &payload)?)
    }

    fn unwrap_caller_dek(
        &self,
        unlocked: &UnlockedIdentity,
        doc: &RecipientsDoc,
    ) -> VaultResult<DataKey> {
        let caller_fp = fingerprint(&unlocked.keypair.public_bytes());
        let record = doc
            .recipients
            .get(&caller_fp)
            .ok_or_else(|| VaultError::NoAccess(self.store.display_name().to_string()))?;
        let dek_bytes = sealbox::open(&record.decode_wrapped_dek()?, &unlocked.keypair.secret)?;
        Ok(DataKey::from_slice(&dek_bytes)?)
    }

    fn load_doc(&self) -> VaultResult<RecipientsDoc> {
        let bytes = self
            .store
            .load_recipients()?
            .ok_or_else(|| VaultError::NoAccess(self.store.display_name().to_string()))?;
        RecipientsDoc::from_bytes(&bytes)
    }

    fn write_meta(&self) -> VaultResult<()> {
        let stamp = now();
        let created_at = self
            .store
            .load_meta()?
            .and_then(|bytes| serde_json::from_slice::<VaultMeta>(&bytes).ok())
            .map(|meta| meta.created_at)
            .unwrap_or_else(|| stamp.clone());

        let meta = VaultMeta {
            name: self.store.display_name().to_string(),
            created_at,
            updated_at: stamp,
        };
        let mut bytes = serde_json::to_vec_pretty(&meta)?;
        bytes.push(b'\n');
        self.store.save_meta(&bytes)?;
        Ok(())
    }
}

fn wrap_dek(dek: &DataKey, recipient_pk: [u8; 32]) -> VaultResult<String> {
    let pk = PublicKey::from(recipient_pk);
    Ok(B64.encode(sealbox::seal(dek.as_bytes(), &pk)?))
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

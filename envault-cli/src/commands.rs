//! Command handlers. Each maps engine errors onto its own exit-code
//! contract, so the match arms differ deliberately from command to
//! command.

use crate::editor;
use crate::envfile;
use crate::failure::Failure;
use crate::prompt;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use envault_identity::{IdentityError, IdentityStore};
use envault_storage::{list_central, ArtifactStore};
use envault_vault::{run_doctor, ShareOutcome, VaultEngine, VaultError};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

fn identity_store() -> Result<IdentityStore, Failure> {
    IdentityStore::default_root()
        .map(IdentityStore::new)
        .ok_or_else(|| Failure::new(1, "cannot determine the home directory"))
}

fn current_dir() -> Result<PathBuf, Failure> {
    std::env::current_dir().map_err(Failure::from)
}

/// Opens the artifact store for `<name|.>`. `bad_name_code` is the exit
/// code the calling command uses for an invalid vault name.
fn resolve_store(
    identity: &IdentityStore,
    target: &str,
    bad_name_code: u8,
) -> Result<ArtifactStore, Failure> {
    if target == "." {
        Ok(ArtifactStore::open_local(&current_dir()?))
    } else {
        ArtifactStore::open_central(identity.root(), target)
            .map_err(|e| Failure::new(bad_name_code, e))
    }
}

pub fn init(label: Option<&str>) -> Result<(), Failure> {
    let identity = identity_store()?;
    if identity.exists() {
        return Err(Failure::new(1, "identity already initialized; run reset first"));
    }

    let label = match label {
        Some(l) => l.to_string(),
        None => prompt::line("Device label: ")?.unwrap_or_else(|| "unnamed-device".to_string()),
    };
    let password = prompt::new_password()?;

    let config = identity.initialize(&password, &label).map_err(|e| match e {
        IdentityError::PasswordTooShort => Failure::new(2, e),
        IdentityError::AlreadyInitialized => Failure::new(1, e),
        other => Failure::new(1, other),
    })?;
    let public = identity.public_key().map_err(|e| Failure::new(1, e))?;

    println!("Identity created.");
    println!("  label:       {}", config.device_label);
    println!("  fingerprint: {}", config.fingerprint);
    println!("  public key:  {}", B64.encode(public));
    println!();
    println!("Share the public key with vault owners to receive access.");
    Ok(())
}

pub fn identity() -> Result<(), Failure> {
    let identity = identity_store()?;
    let config = identity.config().map_err(|e| Failure::new(1, e))?;
    let public = identity.public_key().map_err(|e| Failure::new(1, e))?;

    println!("label:       {}", config.device_label);
    println!("fingerprint: {}", config.fingerprint);
    println!("public key:  {}", B64.encode(public));
    Ok(())
}

pub fn init_repo(env_file: Option<&str>) -> Result<(), Failure> {
    let identity = identity_store()?;
    if !identity.exists() {
        return Err(Failure::new(1, "no identity found; run init first"));
    }

    let plaintext = match env_file {
        Some(path) => fs::read(path)
            .map_err(|e| Failure::new(1, format!("cannot read {path}: {e}")))?,
        None => envfile::TEMPLATE.as_bytes().to_vec(),
    };

    let engine = VaultEngine::new(&identity, ArtifactStore::open_local(&current_dir()?));
    match engine.init_vault(&plaintext, false) {
        Ok(()) => {}
        Err(VaultError::AlreadyExists(name)) => {
            let overwrite = prompt::confirm(&format!(
                "Vault {name:?} already exists. Overwrite and rotate its key?"
            ))?;
            if !overwrite {
                return Err(Failure::new(2, "vault already exists"));
            }
            engine
                .init_vault(&plaintext, true)
                .map_err(|e| Failure::new(1, e))?;
        }
        Err(e) => return Err(Failure::new(1, e)),
    }

    println!("Vault created in .env-vault/ — commit that directory to share it.");
    Ok(())
}

pub fn add(target: &str, file: Option<&str>) -> Result<(), Failure> {
    let identity = identity_store()?;
    let store = resolve_store(&identity, target, 2)?;
    let engine = VaultEngine::new(&identity, store);

    let plaintext = match file {
        Some("-") | None => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .map_err(|e| Failure::new(2, format!("cannot read stdin: {e}")))?;
            bytes
        }
        Some(path) => fs::read(path)
            .map_err(|e| Failure::new(2, format!("cannot read {path}: {e}")))?,
    };

    // A brand-new vault needs no unlock; only an existing one does
    if engine.store().payload_exists() {
        let password = prompt::password("Password: ")?;
        engine.put(&password, &plaintext).map_err(|e| match e {
            VaultError::NoAccess(_) | VaultError::BadCredentials => Failure::new(1, e),
            other => Failure::new(1, other),
        })?;
    } else {
        engine
            .init_vault(&plaintext, true)
            .map_err(|e| Failure::new(1, e))?;
    }

    println!("Vault {} updated.", engine.store().display_name());
    Ok(())
}

pub fn get(target: &str, out_file: Option<&str>) -> Result<(), Failure> {
    let identity = identity_store()?;
    let store = resolve_store(&identity, target, 1)?;
    let engine = VaultEngine::new(&identity, store);

    let password = prompt::password("Password: ")?;
    let plaintext = engine.get(&password).map_err(|e| match e {
        VaultError::BadCredentials => Failure::new(3, e),
        VaultError::Integrity => Failure::new(2, e),
        other => Failure::new(1, other),
    })?;

    match out_file {
        Some(path) => fs::write(path, &plaintext).map_err(Failure::from)?,
        None => io::stdout().write_all(&plaintext).map_err(Failure::from)?,
    }
    Ok(())
}

pub fn share(target: &str, public_key: &str, label: Option<&str>) -> Result<(), Failure> {
    let identity = identity_store()?;
    let store = resolve_store(&identity, target, 2)?;
    let engine = VaultEngine::new(&identity, store);

    let password = prompt::password("Password: ")?;
    match engine.share(&password, public_key, label) {
        Ok(ShareOutcome::Added { fingerprint, label }) => {
            println!("Shared with {label} ({fingerprint}).");
            Ok(())
        }
        Ok(ShareOutcome::AlreadyShared { fingerprint, label }) => {
            println!("Already shared with {label} ({fingerprint}); nothing to do.");
            Ok(())
        }
        Err(VaultError::InvalidPublicKey) => {
            Err(Failure::new(1, "public key must be 32 base64-encoded bytes"))
        }
        Err(e) => Err(Failure::new(2, e)),
    }
}

pub fn revoke(target: &str, fingerprint: &str) -> Result<(), Failure> {
    let identity = identity_store()?;
    let store = resolve_store(&identity, target, 1)?;
    let engine = VaultEngine::new(&identity, store);

    let password = prompt::password("Password: ")?;
    match engine.revoke(&password, fingerprint) {
        Ok(()) => {
            println!("Revoked {fingerprint}; vault key rotated.");
            Ok(())
        }
        Err(VaultError::SelfRevoke) => Err(Failure::new(2, VaultError::SelfRevoke)),
        Err(e @ VaultError::NotARecipient(_)) => {
            if let Ok(view) = engine.recipients() {
                eprintln!("current recipients:");
                for entry in view.entries {
                    eprintln!("  {}  {}", entry.fingerprint, entry.label);
                }
            }
            Err(Failure::new(1, e))
        }
        Err(e) => Err(Failure::new(1, e)),
    }
}

pub fn recipients(target: &str) -> Result<(), Failure> {
    let identity = identity_store()?;
    let store = resolve_store(&identity, target, 1)?;
    let engine = VaultEngine::new(&identity, store);

    let view = engine.recipients().map_err(|e| Failure::new(1, e))?;
    println!(
        "{} (dek version {})",
        engine.store().display_name(),
        view.dek_version
    );
    for entry in view.entries {
        let marker = if entry.is_caller { "  (this device)" } else { "" };
        println!(
            "  {}  {}{}  added {}",
            entry.fingerprint, entry.label, marker, entry.added_at
        );
    }
    Ok(())
}

pub fn list() -> Result<(), Failure> {
    let identity = identity_store()?;
    let names = list_central(identity.root()).map_err(|e| Failure::new(1, e))?;
    if names.is_empty() {
        println!("No central vaults.");
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

pub fn rm(name: &str, force: bool) -> Result<(), Failure> {
    let identity = identity_store()?;
    let store = ArtifactStore::open_central(identity.root(), name)
        .map_err(|e| Failure::new(1, e))?;
    if !store.payload_exists() {
        return Err(Failure::new(1, format!("no vault named {name:?}")));
    }
    if !force && !prompt::confirm(&format!("Delete vault {name:?}? This cannot be undone."))? {
        return Err(Failure::new(1, "aborted"));
    }
    store.remove().map_err(|e| Failure::new(1, e))?;
    println!("Deleted {name}.");
    Ok(())
}

pub fn edit(target: &str) -> Result<(), Failure> {
    let identity = identity_store()?;
    let store = resolve_store(&identity, target, 1)?;
    let engine = VaultEngine::new(&identity, store);

    let password = prompt::password("Password: ")?;
    let changed = engine
        .edit(&password, |content| {
            editor::edit_bytes(&content)
                .map_err(|f| VaultError::Io(io::Error::other(f.message)))
        })
        .map_err(|e| match e {
            VaultError::BadCredentials => Failure::new(3, e),
            VaultError::Integrity => Failure::new(2, e),
            other => Failure::new(1, other),
        })?;

    if changed {
        println!("Vault updated; key rotated.");
    } else {
        println!("No changes.");
    }
    Ok(())
}

pub fn doctor(fix: bool) -> Result<(), Failure> {
    let identity = identity_store()?;
    let report = run_doctor(&identity, Some(&current_dir()?), fix)
        .map_err(|e| Failure::new(1, e))?;

    for issue in &report.issues {
        println!("issue:   {issue}");
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    for fixed in &report.fixes_applied {
        println!("fixed:   {fixed}");
    }

    if report.is_healthy() {
        println!("ok");
        Ok(())
    } else {
        Err(Failure::new(
            1,
            format!("{} issue(s) found; re-run with --fix", report.issues.len()),
        ))
    }
}

pub fn reset(force: bool) -> Result<(), Failure> {
    let identity = identity_store()?;
    if !identity.exists() {
        println!("No identity to remove.");
        return Ok(());
    }
    if !force
        && !prompt::confirm(
            "Delete this device's identity? Vaults it can read become unreadable.",
        )?
    {
        return Err(Failure::new(1, "aborted"));
    }
    identity.remove().map_err(|e| Failure::new(1, e))?;
    println!("Identity removed.");
    Ok(())
}

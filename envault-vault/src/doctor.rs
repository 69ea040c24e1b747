//! The `doctor` integrity checker.
//!
//! Walks the identity root and, when given, the current project's local
//! vault. Asserts on-disk modes (directories at most 0700, sensitive files
//! at most 0600), reports the KDF parameter generation, and checks that
//! the project's `.gitignore` keeps plaintext env files out of version
//! control. Fix mode tightens modes in place and never loosens them.

use crate::error::VaultResult;
use envault_crypto::KdfParams;
use envault_identity::IdentityStore;
use envault_storage::{fsutil, list_central, LOCAL_DIR, REPOS_DIR};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Structured outcome of a doctor run.
#[derive(Clone, Debug, Default)]
pub struct DoctorReport {
    /// Problems that weaken the vault's guarantees (e.g. loose modes).
    pub issues: Vec<String>,
    /// Advisories that do not break any invariant.
    pub warnings: Vec<String>,
    /// Repairs performed, only in fix mode.
    pub fixes_applied: Vec<String>,
}

impl DoctorReport {
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Runs all checks. `project_dir` adds the local-vault and gitignore
/// checks for that directory.
pub fn run_doctor(
    identity: &IdentityStore,
    project_dir: Option<&Path>,
    fix: bool,
) -> VaultResult<DoctorReport> {
    let mut report = DoctorReport::default();
    let root = identity.root();

    if !identity.exists() {
        report
            .warnings
            .push("no identity initialized; run init".to_string());
    } else {
        check_dir(root, fix, &mut report)?;
        check_dir(&root.join("identity"), fix, &mut report)?;
        for file in ["private.key", "public.key", "salt"] {
            check_file(&root.join("identity").join(file), fix, &mut report)?;
        }
        check_file(&root.join("config.json"), fix, &mut report)?;
        check_kdf_generation(identity, &mut report);
    }

    let repos = root.join(REPOS_DIR);
    if repos.is_dir() {
        check_dir(&repos, fix, &mut report)?;
        for name in list_central(root)? {
            let vault_dir = repos.join(&name);
            check_dir(&vault_dir, fix, &mut report)?;
            check_vault_files(&vault_dir, fix, &mut report)?;
        }
    }

    if let Some(project) = project_dir {
        let local = project.join(LOCAL_DIR);
        if local.is_dir() {
            check_dir(&local, fix, &mut report)?;
            check_vault_files(&local, fix, &mut report)?;
        }
        check_project_gitignore(project, &mut report);
    }

    debug!(
        "doctor finished: {} issues, {} warnings, {} fixes",
        report.issues.len(),
        report.warnings.len(),
        report.fixes_applied.len()
    );
    Ok(report)
}

fn check_vault_files(dir: &Path, fix: bool, report: &mut DoctorReport) -> VaultResult<()> {
    for file in ["secrets.enc", "recipients.json", "meta.json"] {
        let path = dir.join(file);
        if path.is_file() {
            check_file(&path, fix, report)?;
        }
    }
    if !dir.join("secrets.enc").is_file() && dir.join("recipients.json").is_file() {
        report.warnings.push(format!(
            "{}: recipients document without a payload; vault is unreadable until re-added",
            dir.display()
        ));
    }
    Ok(())
}

fn check_dir(path: &Path, fix: bool, report: &mut DoctorReport) -> VaultResult<()> {
    check_mode(path, 0o700, fix, report)
}

fn check_file(path: &Path, fix: bool, report: &mut DoctorReport) -> VaultResult<()> {
    if !path.is_file() {
        report
            .issues
            .push(format!("{}: expected file is missing", path.display()));
        return Ok(());
    }
    check_mode(path, 0o600, fix, report)
}

fn check_mode(path: &Path, max: u32, fix: bool, report: &mut DoctorReport) -> VaultResult<()> {
    let Some(mode) = fsutil::mode_of(path)? else {
        return Ok(());
    };
    if mode & !max != 0 {
        if fix {
            fsutil::set_mode(path, max)?;
            report
                .fixes_applied
                .push(format!("{}: mode {mode:04o} -> {max:04o}", path.display()));
        } else {
            report.issues.push(format!(
                "{}: mode {mode:04o} is wider than {max:04o}",
                path.display()
            ));
        }
    }
    Ok(())
}

fn check_kdf_generation(identity: &IdentityStore, report: &mut DoctorReport) {
    let current = KdfParams::current().marker();
    match identity.config() {
        Ok(config) => match config.kdf {
            Some(marker) if marker == current => {}
            Some(marker) => report.warnings.push(format!(
                "identity uses KDF parameters {marker} below the current {current}; re-init to upgrade"
            )),
            None => report.warnings.push(format!(
                "identity config predates KDF markers; parameters may be below {current}"
            )),
        },
        Err(_) => report
            .issues
            .push("config.json is missing or unreadable".to_string()),
    }
}

fn check_project_gitignore(project: &Path, report: &mut DoctorReport) {
    let gitignore = project.join(".gitignore");
    let Ok(content) = fs::read_to_string(&gitignore) else {
        report.warnings.push(
            "project has no .gitignore; add one excluding .env files".to_string(),
        );
        return;
    };
    let covers_env = content.lines().map(str::trim).any(|line| {
        line == ".env" || line == "*.env" || line == ".env*" || line == "*.env.*" || line == ".env.*"
    });
    if !covers_env {
        report.warnings.push(
            "project .gitignore does not exclude .env files".to_string(),
        );
    }
}

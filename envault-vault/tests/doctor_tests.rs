#![cfg(unix)]

use envault_identity::IdentityStore;
use envault_storage::fsutil;
use envault_vault::run_doctor;
use std::fs;

const PASSWORD: &str = "correct horse battery staple";

#[test]
fn healthy_identity_reports_no_issues() {
    let root = tempfile::tempdir().unwrap();
    let identity = IdentityStore::new(root.path());
    identity.initialize(PASSWORD, "laptop").unwrap();

    let report = run_doctor(&identity, None, false).unwrap();
    assert!(report.is_healthy(), "issues: {:?}", report.issues);
    assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    assert!(report.fixes_applied.is_empty());
}

#[test]
fn missing_identity_is_a_warning_not_an_issue() {
    let root = tempfile::tempdir().unwrap();
    let identity = IdentityStore::new(root.path());

    let report = run_doctor(&identity, None, false).unwrap();
    assert!(report.is_healthy());
    assert!(report.warnings.iter().any(|w| w.contains("no identity")));
}

#[test]
fn loose_modes_are_flagged_and_fixed() {
    let root = tempfile::tempdir().unwrap();
    let identity = IdentityStore::new(root.path());
    identity.initialize(PASSWORD, "laptop").unwrap();

    let key_path = root.path().join("identity").join("private.key");
    fsutil::set_mode(&key_path, 0o644).unwrap();

    let report = run_doctor(&identity, None, false).unwrap();
    assert!(!report.is_healthy());
    assert!(report.issues.iter().any(|i| i.contains("private.key")));
    // Check mode was not changed without --fix
    assert_eq!(fsutil::mode_of(&key_path).unwrap(), Some(0o644));

    let report = run_doctor(&identity, None, true).unwrap();
    assert!(report.issues.is_empty());
    assert_eq!(report.fixes_applied.len(), 1);
    assert_eq!(fsutil::mode_of(&key_path).unwrap(), Some(0o600));
}

#[test]
fn fix_never_loosens_a_tight_mode() {
    let root = tempfile::tempdir().unwrap();
    let identity = IdentityStore::new(root.path());
    identity.initialize(PASSWORD, "laptop").unwrap();

    let key_path = root.path().join("identity").join("private.key");
    fsutil::set_mode(&key_path, 0o400).unwrap();

    let report = run_doctor(&identity, None, true).unwrap();
    assert!(report.fixes_applied.is_empty());
    assert_eq!(fsutil::mode_of(&key_path).unwrap(), Some(0o400));
}

#[test]
fn legacy_kdf_marker_warns() {
    let root = tempfile::tempdir().unwrap();
    let identity = IdentityStore::new(root.path());
    identity.initialize(PASSWORD, "laptop").unwrap();

    // Rewrite the config the way an old release would have left it
    let config_path = root.path().join("config.json");
    let mut config: serde_json::Value =
        serde_json::from_slice(&fs::read(&config_path).unwrap()).unwrap();
    config["kdf"] = serde_json::Value::String("scrypt-14-8-1".to_string());
    fs::write(&config_path, serde_json::to_vec_pretty(&config).unwrap()).unwrap();
    fsutil::set_mode(&config_path, 0o600).unwrap();

    let report = run_doctor(&identity, None, false).unwrap();
    assert!(report.warnings.iter().any(|w| w.contains("scrypt-14-8-1")));
}

#[test]
fn project_gitignore_coverage_is_checked() {
    let root = tempfile::tempdir().unwrap();
    let identity = IdentityStore::new(root.path());
    identity.initialize(PASSWORD, "laptop").unwrap();

    let project = tempfile::tempdir().unwrap();
    let report = run_doctor(&identity, Some(project.path()), false).unwrap();
    assert!(report.warnings.iter().any(|w| w.contains(".gitignore")));

    fs::write(project.path().join(".gitignore"), "target/\n*.env\n").unwrap();
    let report = run_doctor(&identity, Some(project.path()), false).unwrap();
    assert!(
        !report.warnings.iter().any(|w| w.contains(".gitignore")),
        "warnings: {:?}",
        report.warnings
    );
}

#[test]
fn local_vault_modes_are_checked() {
    let root = tempfile::tempdir().unwrap();
    let identity = IdentityStore::new(root.path());
    identity.initialize(PASSWORD, "laptop").unwrap();

    let project = tempfile::tempdir().unwrap();
    let local = project.path().join(".env-vault");
    fs::create_dir_all(&local).unwrap();
    fs::write(local.join("secrets.enc"), b"bytes").unwrap();
    fsutil::set_mode(&local, 0o700).unwrap();
    fsutil::set_mode(&local.join("secrets.enc"), 0o664).unwrap();
    fs::write(project.path().join(".gitignore"), "*.env\n").unwrap();

    let report = run_doctor(&identity, Some(project.path()), false).unwrap();
    assert!(report.issues.iter().any(|i| i.contains("secrets.enc")));

    let report = run_doctor(&identity, Some(project.path()), true).unwrap();
    assert!(report.issues.is_empty());
    assert_eq!(
        fsutil::mode_of(&local.join("secrets.enc")).unwrap(),
        Some(0o600)
    );
}

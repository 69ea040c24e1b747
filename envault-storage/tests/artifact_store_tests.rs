use envault_storage::{list_central, ArtifactStore, StorageError, LOCAL_DIR, REPOS_DIR};
use pretty_assertions::assert_eq;
use std::fs;

#[test]
fn central_store_saves_and_loads_artifacts() {
    let root = tempfile::tempdir().unwrap();
    let store = ArtifactStore::open_central(root.path(), "api").unwrap();

    assert!(!store.payload_exists());
    assert!(store.load_payload().unwrap().is_none());

    store.save_payload(b"ciphertext").unwrap();
    store.save_recipients(b"{\"dek_version\":1}").unwrap();
    store.save_meta(b"{}").unwrap();

    assert!(store.payload_exists());
    assert_eq!(store.load_payload().unwrap().unwrap(), b"ciphertext");
    assert_eq!(store.load_recipients().unwrap().unwrap(), b"{\"dek_version\":1}");
    assert_eq!(store.load_meta().unwrap().unwrap(), b"{}");
    assert!(store.dir().ends_with(format!("{REPOS_DIR}/api")));
}

#[test]
fn invalid_names_touch_nothing_on_disk() {
    let root = tempfile::tempdir().unwrap();

    for name in [".", "..", "../x", "foo/bar", "foo\\bar", ".hidden", ""] {
        assert!(matches!(
            ArtifactStore::open_central(root.path(), name),
            Err(StorageError::InvalidName(_))
        ));
    }
    // Nothing was created, not even the repos parent
    assert!(!root.path().join(REPOS_DIR).exists());
}

#[test]
fn local_store_uses_project_basename_and_gitignore() {
    let project = tempfile::tempdir().unwrap();
    let project_dir = project.path().join("billing-service");
    fs::create_dir(&project_dir).unwrap();

    let store = ArtifactStore::open_local(&project_dir);
    assert_eq!(store.display_name(), "billing-service");
    assert!(store.is_local());

    store.save_payload(b"ciphertext").unwrap();

    let gitignore = project_dir.join(LOCAL_DIR).join(".gitignore");
    let content = fs::read_to_string(&gitignore).unwrap();
    assert!(content.contains("*.env"));
    assert!(content.contains("!*.enc"));
}

#[test]
fn listing_skips_dotfiles_temp_files_and_empty_vaults() {
    let root = tempfile::tempdir().unwrap();
    let repos = root.path().join(REPOS_DIR);
    fs::create_dir_all(repos.join("real")).unwrap();
    fs::write(repos.join("real").join("secrets.enc"), b"bytes").unwrap();

    // Vault directory without a payload: not listed
    fs::create_dir_all(repos.join("half-made")).unwrap();
    // Vault with a zero-byte payload: treated as absent
    fs::create_dir_all(repos.join("empty")).unwrap();
    fs::write(repos.join("empty").join("secrets.enc"), b"").unwrap();
    // Dot-directory and stray files: ignored
    fs::create_dir_all(repos.join(".git")).unwrap();
    fs::write(repos.join(".DS_Store"), b"junk").unwrap();
    fs::write(repos.join("stray.tmp"), b"junk").unwrap();

    assert_eq!(list_central(root.path()).unwrap(), vec!["real".to_string()]);
}

#[test]
fn listing_with_no_repos_dir_is_empty() {
    let root = tempfile::tempdir().unwrap();
    assert!(list_central(root.path()).unwrap().is_empty());
}

#[test]
fn remove_deletes_the_vault_directory() {
    let root = tempfile::tempdir().unwrap();
    let store = ArtifactStore::open_central(root.path(), "gone").unwrap();
    store.save_payload(b"bytes").unwrap();
    assert!(store.dir().is_dir());

    store.remove().unwrap();
    assert!(!store.dir().exists());
    // Removing again is fine
    store.remove().unwrap();
}

#[cfg(unix)]
#[test]
fn artifacts_have_restricted_modes() {
    use envault_storage::fsutil;

    let root = tempfile::tempdir().unwrap();
    let store = ArtifactStore::open_central(root.path(), "modes").unwrap();
    store.save_payload(b"bytes").unwrap();
    store.save_recipients(b"{}").unwrap();

    assert_eq!(fsutil::mode_of(store.dir()).unwrap(), Some(0o700));
    assert_eq!(
        fsutil::mode_of(&store.dir().join("secrets.enc")).unwrap(),
        Some(0o600)
    );
    assert_eq!(
        fsutil::mode_of(&store.dir().join("recipients.json")).unwrap(),
        Some(0o600)
    );
}

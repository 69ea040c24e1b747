//! The artifact store: one interface over the central and local layouts.

use crate::error::StorageResult;
use crate::fsutil;
use crate::names::validate_name;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Encrypted payload file name.
pub const PAYLOAD_FILE: &str = "secrets.enc";

/// Recipients document file name.
pub const RECIPIENTS_FILE: &str = "recipients.json";

/// Optional metadata file name.
pub const META_FILE: &str = "meta.json";

/// Per-project vault directory name.
pub const LOCAL_DIR: &str = ".env-vault";

/// Central per-name vault parent, under the identity root.
pub const REPOS_DIR: &str = "repos";

/// Gitignore dropped into local vault directories: plaintext env files
/// stay out of version control, encrypted artifacts go in.
const LOCAL_GITIGNORE: &str = "*.env\n*.env.*\n!*.enc\n";

#[cfg(unix)]
const GITIGNORE_MODE: u32 = 0o644;

/// One vault's on-disk artifacts (payload, recipients, metadata).
///
/// The store owns layout and I/O only; artifact contents are opaque here.
pub struct ArtifactStore {
    dir: PathBuf,
    display_name: String,
    local: bool,
}

impl ArtifactStore {
    /// Opens the central backend `<root>/repos/<name>/`.
    ///
    /// The name is validated before any path is formed; an invalid name
    /// touches nothing on disk.
    pub fn open_central(root: &Path, name: &str) -> StorageResult<Self> {
        validate_name(name)?;
        Ok(Self {
            dir: root.join(REPOS_DIR).join(name),
            display_name: name.to_string(),
            local: false,
        })
    }

    /// Opens the local backend `<project>/.env-vault/`.
    ///
    /// The display name is the project directory's basename.
    pub fn open_local(project_dir: &Path) -> Self {
        let display_name = project_dir
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        Self {
            dir: project_dir.join(LOCAL_DIR),
            display_name,
            local: true,
        }
    }

    /// Vault directory this store reads and writes.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Human-facing vault name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_local(&self) -> bool {
        self.local
    }

    /// Whether a usable payload exists (present and non-empty).
    pub fn payload_exists(&self) -> bool {
        fs::metadata(self.dir.join(PAYLOAD_FILE)).is_ok_and(|m| m.is_file() && m.len() > 0)
    }

    pub fn load_payload(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(fsutil::read_optional(&self.dir.join(PAYLOAD_FILE))?)
    }

    pub fn save_payload(&self, bytes: &[u8]) -> StorageResult<()> {
        self.ensure_layout()?;
        fsutil::atomic_write(&self.dir.join(PAYLOAD_FILE), bytes)?;
        debug!("wrote payload for vault {}", self.display_name);
        Ok(())
    }

    pub fn load_recipients(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(fsutil::read_optional(&self.dir.join(RECIPIENTS_FILE))?)
    }

    pub fn save_recipients(&self, bytes: &[u8]) -> StorageResult<()> {
        self.ensure_layout()?;
        fsutil::atomic_write(&self.dir.join(RECIPIENTS_FILE), bytes)?;
        Ok(())
    }

    pub fn load_meta(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(fsutil::read_optional(&self.dir.join(META_FILE))?)
    }

    pub fn save_meta(&self, bytes: &[u8]) -> StorageResult<()> {
        self.ensure_layout()?;
        fsutil::atomic_write(&self.dir.join(META_FILE), bytes)?;
        Ok(())
    }

    /// Deletes the vault directory and everything in it.
    pub fn remove(&self) -> StorageResult<()> {
        if self.dir.is_dir() {
            fs::remove_dir_all(&self.dir)?;
            debug!("removed vault {}", self.display_name);
        }
        Ok(())
    }

    fn ensure_layout(&self) -> StorageResult<()> {
        fsutil::ensure_dir(&self.dir)?;
        if self.local {
            let gitignore = self.dir.join(".gitignore");
            if !gitignore.is_file() {
                fs::write(&gitignore, LOCAL_GITIGNORE)?;
                #[cfg(unix)]
                fsutil::set_mode(&gitignore, GITIGNORE_MODE)?;
            }
        }
        Ok(())
    }
}

/// Lists central vaults under `<root>/repos/` that have a usable payload.
///
/// Dotfiles, stray temp files, and non-directories are skipped. Returned
/// names are sorted.
pub fn list_central(root: &Path) -> StorageResult<Vec<String>> {
    let repos = root.join(REPOS_DIR);
    if !repos.is_dir() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(&repos)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let payload = entry.path().join(PAYLOAD_FILE);
        if fs::metadata(&payload).is_ok_and(|m| m.is_file() && m.len() > 0) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

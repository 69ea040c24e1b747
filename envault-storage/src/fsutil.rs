//! Filesystem helpers: atomic writes, restricted modes, tolerant reads.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Mode for directories holding secrets.
pub const DIR_MODE: u32 = 0o700;

/// Mode for sensitive files.
pub const FILE_MODE: u32 = 0o600;

/// Sets a file's mode. No-op on platforms without Unix permissions.
#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
pub fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

/// Reads a file's mode bits, or `None` where modes don't exist.
#[cfg(unix)]
pub fn mode_of(path: &Path) -> io::Result<Option<u32>> {
    use std::os::unix::fs::PermissionsExt;
    Ok(Some(fs::metadata(path)?.permissions().mode() & 0o777))
}

#[cfg(not(unix))]
pub fn mode_of(_path: &Path) -> io::Result<Option<u32>> {
    Ok(None)
}

/// Creates `path` (and parents) if needed and restricts it to [`DIR_MODE`].
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path)?;
    }
    set_mode(path, DIR_MODE)
}

/// Atomically replaces `path` with `bytes`, mode [`FILE_MODE`].
///
/// Writes to a sibling temp file, fsyncs, renames over the target, then
/// reasserts the mode. The temp file is unlinked on any failure, so a
/// reader observes either the old content or the new, never a partial file.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "write target has no parent directory")
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    set_mode(tmp.path(), FILE_MODE)?;
    tmp.persist(path).map_err(|e| e.error)?;
    // Rename preserves the temp file's mode, but reassert in case the
    // platform filled in something wider.
    set_mode(path, FILE_MODE)
}

/// Reads a file, treating a missing or zero-byte target as absent.
///
/// A zero-byte artifact means a writer died before its first rename
/// landed; per the recovery rules that is "no vault", not corruption.
pub fn read_optional(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) if bytes.is_empty() => Ok(None),
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

//! `$EDITOR` spawning for the edit command.

use crate::failure::Failure;
use envault_storage::fsutil;
use std::env;
use std::fs;
use std::io::Write;
use std::process::Command;

/// Characters that would let an editor value smuggle shell syntax.
const SHELL_METACHARACTERS: [char; 5] = [';', '&', '|', '`', '$'];

/// Resolves the editor from `VISUAL` then `EDITOR`, falling back to `vi`.
///
/// Values containing shell metacharacters are rejected outright; the
/// value is split on whitespace so `EDITOR="code --wait"` works without
/// ever passing through a shell.
fn resolve() -> Result<Vec<String>, Failure> {
    let value = env::var("VISUAL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| env::var("EDITOR").ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| "vi".to_string());

    if value.contains(SHELL_METACHARACTERS) {
        return Err(Failure::new(
            1,
            "refusing editor value containing shell metacharacters",
        ));
    }

    Ok(value.split_whitespace().map(str::to_string).collect())
}

/// Writes `content` to a 0600 scratch file, opens the editor on it, and
/// returns the file's bytes afterwards. The scratch file is unlinked when
/// this returns.
pub fn edit_bytes(content: &[u8]) -> Result<Vec<u8>, Failure> {
    let argv = resolve()?;

    let mut scratch = tempfile::Builder::new()
        .prefix(".envault-edit-")
        .suffix(".env")
        .tempfile()
        .map_err(Failure::from)?;
    scratch.write_all(content).map_err(Failure::from)?;
    scratch.flush().map_err(Failure::from)?;
    fsutil::set_mode(scratch.path(), 0o600).map_err(Failure::from)?;

    let status = Command::new(&argv[0])
        .args(&argv[1..])
        .arg(scratch.path())
        .status()
        .map_err(|e| Failure::new(1, format!("cannot launch editor {:?}: {e}", argv[0])))?;
    if !status.success() {
        return Err(Failure::new(1, "editor exited with a failure status"));
    }

    fs::read(scratch.path()).map_err(Failure::from)
}

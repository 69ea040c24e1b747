//! Central vault name validation.
//!
//! Names become path components under `repos/`, so validation is the only
//! thing standing between user input and directory traversal.

use crate::error::{StorageError, StorageResult};

/// Whether `name` is acceptable as a central vault name.
///
/// Accepted: `[A-Za-z0-9][A-Za-z0-9._-]{0,99}`. Rejected regardless of
/// that shape: `.` and `..`, anything containing a path separator or a
/// `..` sequence, and names over 100 bytes.
pub fn is_valid_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 100 {
        return false;
    }
    if name == "." || name == ".." || name.contains("..") {
        return false;
    }
    if name.contains('/') || name.contains('\\') {
        return false;
    }

    let mut bytes = name.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-')
}

/// Validates `name`, failing with [`StorageError::InvalidName`].
///
/// No filesystem operation happens for an invalid name.
pub fn validate_name(name: &str) -> StorageResult<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}

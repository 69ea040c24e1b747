//! Command failures carrying their exit code.

use std::fmt::Display;

/// A failed command: message for stderr plus the process exit code.
///
/// Exit codes are per-command contracts (e.g. `get` distinguishes
/// no-access, integrity, and wrong-password), so handlers construct
/// failures explicitly instead of relying on blanket conversions.
#[derive(Debug)]
pub struct Failure {
    pub code: u8,
    pub message: String,
}

impl Failure {
    pub fn new(code: u8, message: impl Display) -> Self {
        Self { code, message: message.to_string() }
    }
}

impl From<std::io::Error> for Failure {
    fn from(e: std::io::Error) -> Self {
        Self::new(1, e)
    }
}

//! Interactive prompts: passwords and confirmations.

use crate::failure::Failure;
use std::io::{self, BufRead, Write};

/// Prompts for the identity password.
pub fn password(prompt: &str) -> Result<String, Failure> {
    rpassword::prompt_password(prompt)
        .map_err(|e| Failure::new(1, format!("cannot read password: {e}")))
}

/// Prompts twice and insists the entries match (for init).
pub fn new_password() -> Result<String, Failure> {
    let first = password("Password: ")?;
    let second = password("Confirm password: ")?;
    if first != second {
        return Err(Failure::new(2, "passwords do not match"));
    }
    Ok(first)
}

/// Asks a yes/no question, defaulting to no.
pub fn confirm(question: &str) -> Result<bool, Failure> {
    print!("{question} [y/N] ");
    io::stdout().flush().map_err(Failure::from)?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(Failure::from)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
}

/// Reads a free-form line, returning `None` for an empty entry.
pub fn line(prompt: &str) -> Result<Option<String>, Failure> {
    print!("{prompt}");
    io::stdout().flush().map_err(Failure::from)?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(Failure::from)?;
    let trimmed = answer.trim();
    Ok(if trimmed.is_empty() { None } else { Some(trimmed.to_string()) })
}

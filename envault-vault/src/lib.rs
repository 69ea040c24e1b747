//! The env-vault engine.
//!
//! Enforces the DEK lifecycle over the artifact store: every vault's
//! ciphertext, its recipients document, and its DEK version must agree.
//! Content mutations and revocations rotate the DEK; shares extend the
//! readership of the current one.
//!
//! The engine borrows the identity store and the artifact store and holds
//! no state of its own between calls; the only state is what's on disk.

mod doctor;
mod engine;
mod error;
mod meta;
mod recipients;

pub use doctor::{run_doctor, DoctorReport};
pub use engine::{RecipientEntry, RecipientsView, ShareOutcome, VaultEngine};
pub use error::{VaultError, VaultResult};
pub use meta::VaultMeta;
pub use recipients::{decode_public_key, RecipientRecord, RecipientsDoc};

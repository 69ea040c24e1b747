//! Public key fingerprints.

use sha2::{Digest, Sha256};

/// Length of a rendered fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 16;

/// First 8 bytes of SHA-256 over the public key, as 16 lowercase hex chars.
///
/// A display identifier with 32-bit birthday resistance, suitable as the
/// recipient-map key but not as an authentication token.
pub fn fingerprint(public_key: &[u8]) -> String {
    let digest = Sha256::digest(public_key);
    hex::encode(&digest[..FINGERPRINT_LEN / 2])
}

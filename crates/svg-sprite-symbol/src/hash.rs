//! Content hashing for collision-free symbol ids.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest.
pub const HASH_LEN: usize = 8;

/// Truncated SHA-256 hex digest of `content`.
pub fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    digest
        .iter()
        .take(HASH_LEN / 2)
        .map(|b| format!("{b:02x}"))
        .collect()
}

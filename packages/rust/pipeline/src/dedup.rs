//! Content hashing for deduplication.
//!
//! The hash covers cleaned text only, so markup or chrome changes that leave
//! the readable content intact never produce a "new" item.

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of the given cleaned text.
pub fn content_hash(cleaned_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(cleaned_text.as_bytes());
    format!("{:x}", hasher.finalize())
}

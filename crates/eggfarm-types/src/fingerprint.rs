//! Content fingerprints
//!
//! Ids are for display and duplicate heuristics only. Truncated digests can
//! collide and nothing relies on them being unique.

use sha2::{Digest, Sha256};

/// Hex length of a training example id
pub const EXAMPLE_ID_LEN: usize = 12;
/// Hex length of a content hash used for repetition checks
pub const CONTENT_HASH_LEN: usize = 16;

fn digest(parts: &[&str], len: usize) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    let mut hex = hex::encode(hasher.finalize());
    hex.truncate(len);
    hex
}

/// Id of a training example, derived from its text and creation time
pub fn example_id(input: &str, output: &str, timestamp: &str) -> String {
    digest(&[input, output, timestamp], EXAMPLE_ID_LEN)
}

/// Hash of an example's `input + output`
pub fn content_hash(input: &str, output: &str) -> String {
    digest(&[input, output], CONTENT_HASH_LEN)
}

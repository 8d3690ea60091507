//! Content hashing of the effective configuration.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::similarity::SimilarityConfig;

/// Compute SHA256 hash of a serializable value.
///
/// The value is serialized to JSON before hashing, so maps must have a
/// stable key order (`BTreeMap`) for the output to be deterministic.
/// Returns a 64-character lowercase hexadecimal string.
pub fn compute_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Fingerprint of an engine configuration, recorded with batch results.
pub fn config_fingerprint(config: &SimilarityConfig) -> Result<String, serde_json::Error> {
    compute_hash(config)
}

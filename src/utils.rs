//! Common utilities shared across modules.

use chrono::Utc;
use sha2::{Digest, Sha256};

/// Get current UTC timestamp in seconds since UNIX_EPOCH.
///
/// Uses chrono for accurate cross-platform timestamp.
pub fn get_utc_timestamp() -> u64 {
    Utc::now().timestamp() as u64
}

/// Hex-encoded SHA256 of the given bytes.
pub fn calculate_hash(content: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_ref());
    format!("{:x}", hasher.finalize())
}

//! Canonical content checksums
//!
//! Every checksum in the workspace has the form `sha256:<64 lowercase hex>`.
//! The checksum registry stores these strings per generated block, so the
//! format has to stay stable across versions.

use sha2::{Digest, Sha256};

const PREFIX: &str = "sha256:";

fn format_digest(bytes: &[u8]) -> String {
    format!("{}{:x}", PREFIX, Sha256::digest(bytes))
}

/// Checksum of string content, byte for byte (line terminators included).
pub fn compute_content_checksum(content: &str) -> String {
    format_digest(content.as_bytes())
}

/// Whether `value` is a well-formed checksum string.
pub fn is_checksum(value: &str) -> bool {
    value
        .strip_prefix(PREFIX)
        .is_some_and(|hex| hex.len() == 64 && hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')))
}

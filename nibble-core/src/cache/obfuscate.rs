//! Reversible at-rest encoding for cache values.
//!
//! This is obfuscation, not encryption: the transform is deterministic and
//! keyless, so anyone with the source can reverse it. It only keeps plain
//! JSON out of platform storage. Do not rely on it for confidentiality.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const MASK: &[u8] = b"nibble.cache.v1";

fn apply_mask(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .zip(MASK.iter().cycle())
        .map(|(b, m)| b ^ m)
        .collect()
}

/// Encodes `plain` for storage.
pub fn conceal(plain: &str) -> String {
    STANDARD.encode(apply_mask(plain.as_bytes()))
}

/// Reverses [`conceal`]. Returns `None` when `stored` was not produced by it.
pub fn reveal(stored: &str) -> Option<String> {
    let bytes = STANDARD.decode(stored.trim()).ok()?;
    String::from_utf8(apply_mask(&bytes)).ok()
}

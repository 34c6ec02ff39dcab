//! # Hashing Utilities
//!
//! BLAKE3 everywhere. Permission keys are derived with BLAKE3's
//! `derive_key` mode so that a digest computed for one purpose can never be
//! replayed as a digest for another: the context string selects a different
//! internal IV, which makes cross-context collisions impossible by
//! construction rather than by convention.

use crate::config::HASH_OUTPUT_LENGTH;

/// Domain-separated BLAKE3 hash over several slices, fed sequentially.
///
/// Equivalent to hashing the concatenation of `parts`, without allocating
/// the concatenation. Callers hashing variable-length parts must make the
/// boundaries unambiguous themselves; fixed-width parts (selectors,
/// addresses) are unambiguous already.
///
/// The context must be a hardcoded, globally unique string. Never build it
/// from runtime input.
///
/// # Example
///
/// ```
/// use warden_protocol::crypto::domain_separated_hash_multi;
///
/// let key = domain_separated_hash_multi("warden doc example", &[b"withdraw", b"alice"]);
/// assert_eq!(key.len(), 32);
/// ```
pub fn domain_separated_hash_multi(context: &str, parts: &[&[u8]]) -> [u8; HASH_OUTPUT_LENGTH] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

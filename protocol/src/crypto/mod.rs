//! # Cryptographic Primitives for Warden
//!
//! Warden needs exactly one cryptographic tool: a collision-resistant hash
//! to bind a selector, a principal and a target into one permission key.
//! We use BLAKE3 in derive-key mode and refuse to be clever about it.

pub mod hash;

pub use hash::domain_separated_hash_multi;

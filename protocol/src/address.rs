//! # Account Addresses
//!
//! An [`Address`] names anything that can hold a balance or make a call:
//! principals, tokens, the vault itself. It is 20 raw bytes on the inside
//! and `0x`-prefixed lowercase hex on the outside (logs, JSON, CLI flags).
//!
//! Inside a 32-byte ABI word an address is right-aligned; the 12 leading
//! bytes must be zero. [`Address::from_word`] enforces that, because a
//! decoder that silently drops dirty high bytes is a decoder that lets two
//! different words mean the same account.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::{ADDRESS_LENGTH, WORD_SIZE};

/// Errors produced when parsing an address from text or from an ABI word.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The text was not valid hexadecimal.
    #[error("invalid hex in address: {0}")]
    InvalidHex(String),

    /// The decoded byte length was not 20.
    #[error("invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),

    /// The ABI word carried non-zero bytes above the low 20.
    #[error("dirty address word: high bytes must be zero")]
    DirtyHighBytes,
}

/// A 20-byte account identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; ADDRESS_LENGTH]);

    /// Wraps raw bytes.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Builds an address whose low 8 bytes hold `n` big-endian.
    ///
    /// Handy for fixtures and simulations where readable addresses beat
    /// random ones.
    pub fn from_low_u64_be(n: u64) -> Self {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[ADDRESS_LENGTH - 8..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Extracts an address from a right-aligned 32-byte word.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::DirtyHighBytes`] if any of the 12 padding
    /// bytes is non-zero.
    pub fn from_word(word: &[u8; WORD_SIZE]) -> Result<Self, AddressError> {
        let pad = WORD_SIZE - ADDRESS_LENGTH;
        if word[..pad].iter().any(|b| *b != 0) {
            return Err(AddressError::DirtyHighBytes);
        }
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&word[pad..]);
        Ok(Self(bytes))
    }

    /// Encodes the address as a right-aligned 32-byte word.
    pub fn to_word(&self) -> [u8; WORD_SIZE] {
        let mut word = [0u8; WORD_SIZE];
        word[WORD_SIZE - ADDRESS_LENGTH..].copy_from_slice(&self.0);
        word
    }

    /// Lowercase hex with a `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(stripped).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let bytes: [u8; ADDRESS_LENGTH] = raw
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength(raw.len()))?;
        Ok(Self(bytes))
    }
}

impl From<[u8; ADDRESS_LENGTH]> for Address {
    fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

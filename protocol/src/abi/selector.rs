//! 4-byte operation selectors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::{EXECUTE_SELECTOR, SELECTOR_LENGTH, SWEEP_SELECTOR, WITHDRAW_SELECTOR};

/// Short identifier naming which operation a payload invokes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector([u8; SELECTOR_LENGTH]);

impl Selector {
    /// `execute(address,bytes)`.
    pub const EXECUTE: Selector = Selector(EXECUTE_SELECTOR);
    /// `withdraw(address,address,uint256)`.
    pub const WITHDRAW: Selector = Selector(WITHDRAW_SELECTOR);
    /// `sweepFunds(address,address)`.
    pub const SWEEP: Selector = Selector(SWEEP_SELECTOR);

    /// Wraps raw bytes.
    pub const fn new(bytes: [u8; SELECTOR_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; SELECTOR_LENGTH] {
        &self.0
    }

    /// Human-readable signature for the selectors this protocol defines.
    pub fn signature(&self) -> Option<&'static str> {
        match *self {
            Selector::EXECUTE => Some("execute(address,bytes)"),
            Selector::WITHDRAW => Some("withdraw(address,address,uint256)"),
            Selector::SWEEP => Some("sweepFunds(address,address)"),
            _ => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.signature() {
            Some(sig) => write!(f, "Selector({self} {sig})"),
            None => write!(f, "Selector({self})"),
        }
    }
}

impl FromStr for Selector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(stripped).map_err(|e| format!("invalid selector hex: {e}"))?;
        let bytes: [u8; SELECTOR_LENGTH] = raw
            .as_slice()
            .try_into()
            .map_err(|_| format!("selector must be 4 bytes, got {}", raw.len()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

//! `u128` amounts as decimal strings.
//!
//! JSON numbers lose precision past 2^53 in most consumers, and a vault
//! holding 10^24 base units is ordinary. Amounts cross every text boundary
//! as strings. Use with `#[serde(with = "warden_protocol::ledger::amount")]`.

use serde::{Deserialize, Deserializer, Serializer};

/// Parses a decimal amount. Underscores are accepted as digit separators.
pub fn parse(s: &str) -> Result<u128, String> {
    let cleaned: String = s.trim().chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("invalid amount: {s:?}"));
    }
    cleaned
        .parse::<u128>()
        .map_err(|e| format!("invalid amount {s:?}: {e}"))
}

/// Serializes an amount as a decimal string.
pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

/// Deserializes an amount from a decimal string.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(serde::de::Error::custom)
}

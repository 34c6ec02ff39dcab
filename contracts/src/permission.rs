//! # Permission Registry
//!
//! The unit of grant is an [`ActionId`]: a hash binding one selector to one
//! `(principal, target)` pair. Granting `withdraw` to a player on this vault
//! says nothing about `sweepFunds`, nothing about other players and nothing
//! about other vaults.
//!
//! The registry is written once, at initialization, and never again. There
//! is no revoke and no re-grant.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use warden_protocol::abi::Selector;
use warden_protocol::config::{ACTION_ID_CONTEXT, HASH_OUTPUT_LENGTH};
use warden_protocol::crypto::domain_separated_hash_multi;
use warden_protocol::Address;

use crate::error::VaultError;

/// Opaque identifier of one `(selector, principal, target)` grant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId([u8; HASH_OUTPUT_LENGTH]);

impl ActionId {
    /// Derives the id for `principal` invoking `selector` on `target`.
    ///
    /// All three inputs are fixed width, so the concatenation is
    /// unambiguous without length prefixes.
    pub fn derive(selector: Selector, principal: Address, target: Address) -> Self {
        Self(domain_separated_hash_multi(
            ACTION_ID_CONTEXT,
            &[selector.as_bytes(), principal.as_bytes(), target.as_bytes()],
        ))
    }

    /// Returns the raw digest.
    pub fn as_bytes(&self) -> &[u8; HASH_OUTPUT_LENGTH] {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionId({self})")
    }
}

impl FromStr for ActionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(stripped).map_err(|e| format!("invalid action id hex: {e}"))?;
        let bytes: [u8; HASH_OUTPUT_LENGTH] = raw
            .as_slice()
            .try_into()
            .map_err(|_| format!("action id must be 32 bytes, got {}", raw.len()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for ActionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ActionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Set of granted action ids, written exactly once.
#[derive(Debug, Clone, Default)]
pub struct PermissionRegistry {
    granted: BTreeSet<ActionId>,
    initialized: bool,
}

impl PermissionRegistry {
    /// Creates an empty, uninitialized registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants every id in `entries` and seals the registry.
    ///
    /// An empty set still seals it. Returns the distinct ids granted, in
    /// sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::AlreadyInitialized`] on any second call; the
    /// registry is left exactly as the first call set it.
    pub fn init<I>(&mut self, entries: I) -> Result<Vec<ActionId>, VaultError>
    where
        I: IntoIterator<Item = ActionId>,
    {
        if self.initialized {
            return Err(VaultError::AlreadyInitialized);
        }
        self.granted.extend(entries);
        self.initialized = true;
        Ok(self.granted.iter().copied().collect())
    }

    /// Pure lookup.
    pub fn is_permitted(&self, id: &ActionId) -> bool {
        self.granted.contains(id)
    }

    /// Whether [`init`](Self::init) has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of granted ids.
    pub fn len(&self) -> usize {
        self.granted.len()
    }

    /// Returns `true` if nothing is granted.
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }

    /// Granted ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionId> {
        self.granted.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    #[test]
    fn action_id_binds_every_component() {
        let base = ActionId::derive(Selector::WITHDRAW, addr(1), addr(2));
        assert_eq!(base, ActionId::derive(Selector::WITHDRAW, addr(1), addr(2)));
        assert_ne!(base, ActionId::derive(Selector::SWEEP, addr(1), addr(2)));
        assert_ne!(base, ActionId::derive(Selector::WITHDRAW, addr(3), addr(2)));
        assert_ne!(base, ActionId::derive(Selector::WITHDRAW, addr(1), addr(3)));
        // principal and target are not interchangeable
        assert_ne!(base, ActionId::derive(Selector::WITHDRAW, addr(2), addr(1)));
    }

    #[test]
    fn action_id_text_roundtrip() {
        let id = ActionId::derive(Selector::SWEEP, addr(1), addr(2));
        let parsed: ActionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("0x00".parse::<ActionId>().is_err());
    }

    #[test]
    fn init_grants_and_seals() {
        let id = ActionId::derive(Selector::WITHDRAW, addr(1), addr(2));
        let mut registry = PermissionRegistry::new();
        assert!(!registry.is_initialized());
        assert!(!registry.is_permitted(&id));

        let granted = registry.init([id, id]).unwrap();
        assert_eq!(granted, vec![id]);
        assert!(registry.is_initialized());
        assert!(registry.is_permitted(&id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn second_init_fails_and_changes_nothing() {
        let first = ActionId::derive(Selector::WITHDRAW, addr(1), addr(2));
        let second = ActionId::derive(Selector::SWEEP, addr(1), addr(2));
        let mut registry = PermissionRegistry::new();
        registry.init([first]).unwrap();

        assert_eq!(registry.init([second]), Err(VaultError::AlreadyInitialized));
        assert!(registry.is_permitted(&first));
        assert!(!registry.is_permitted(&second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn empty_init_still_seals() {
        let mut registry = PermissionRegistry::new();
        registry.init(std::iter::empty()).unwrap();
        assert!(registry.is_initialized());
        assert!(registry.is_empty());
        assert!(registry.init(std::iter::empty()).is_err());
    }
}

//! Vault event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_protocol::Address;

use crate::permission::ActionId;

/// Something that changed vault state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum VaultEvent {
    /// Permissions were set.
    Initialized {
        /// Who set them.
        who: Address,
        /// What was granted.
        ids: Vec<ActionId>,
    },
    /// A rate-limited withdrawal went through.
    Withdrawal {
        /// Token withdrawn.
        token: Address,
        /// Who received it.
        recipient: Address,
        /// Amount moved.
        #[serde(with = "warden_protocol::ledger::amount")]
        amount: u128,
        /// When.
        at: DateTime<Utc>,
    },
    /// A full-balance sweep went through.
    Sweep {
        /// Token swept.
        token: Address,
        /// Who received it.
        receiver: Address,
        /// Amount moved.
        #[serde(with = "warden_protocol::ledger::amount")]
        amount: u128,
        /// When.
        at: DateTime<Utc>,
    },
}

//! # Emergency Sweep
//!
//! Moves the vault's whole balance of one token to a receiver. No cap, no
//! cooldown, no partial sweep. That is the point of it, and also why the
//! permission for it must never be confused with the permission to
//! withdraw.

use tracing::debug;

use warden_protocol::ledger::TokenLedger;
use warden_protocol::Address;

use crate::error::VaultError;

/// Stateless sweep operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepManager;

impl SweepManager {
    /// Transfers everything `vault` holds of `token` to `receiver` and
    /// returns the amount moved. A zero balance sweeps zero and succeeds.
    pub fn sweep<L: TokenLedger>(
        &self,
        ledger: &mut L,
        vault: Address,
        receiver: Address,
        token: Address,
    ) -> Result<u128, VaultError> {
        let amount = ledger.balance_of(token, vault);
        if amount == 0 {
            debug!(%token, "sweep of empty balance");
            return Ok(0);
        }
        ledger.transfer(token, vault, receiver, amount)?;
        Ok(amount)
    }
}

//! # In-Memory Balance Sheet
//!
//! A [`BalanceSheet`] maps `(token, holder)` to an amount. It is the ledger
//! every test and every simulation runs against. Credits are checked for
//! overflow, debits for overdraft, and a transfer validates both legs before
//! touching either.
//!
//! The sheet holds amounts only. Time belongs to whoever drives it, through a
//! [`Clock`](crate::clock::Clock), so replaying the same operations always
//! yields the same sheet.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LedgerError, TokenLedger};
use crate::address::Address;

/// Flattened row of a balance sheet, for reporting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    /// The token.
    pub token: Address,
    /// The holder.
    pub holder: Address,
    /// Balance in smallest units.
    #[serde(with = "super::amount")]
    pub amount: u128,
}

// ---------------------------------------------------------------------------
// BalanceSheet
// ---------------------------------------------------------------------------

/// In-memory token ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalanceSheet {
    balances: HashMap<(Address, Address), u128>,
}

impl BalanceSheet {
    /// Creates an empty balance sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `amount` new units of `token` for `holder`.
    ///
    /// This is the deposit path from outside the system: the harness mints
    /// to a funder, the funder transfers to the vault.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if the credit would exceed `u128::MAX`.
    pub fn mint(
        &mut self,
        token: Address,
        holder: Address,
        amount: u128,
    ) -> Result<u128, LedgerError> {
        let current = self.balance_of(token, holder);
        let new_amount = current.checked_add(amount).ok_or(LedgerError::Overflow {
            token,
            holder,
            current,
            credit: amount,
        })?;
        self.set(token, holder, new_amount);
        Ok(new_amount)
    }

    /// Sum of every holder's balance of `token`.
    pub fn total_supply(&self, token: Address) -> u128 {
        self.balances
            .iter()
            .filter(|((t, _), _)| *t == token)
            .fold(0u128, |acc, (_, amount)| acc.saturating_add(*amount))
    }

    /// All non-zero balances, sorted by token then holder.
    pub fn entries(&self) -> Vec<BalanceEntry> {
        let mut rows: Vec<_> = self
            .balances
            .iter()
            .filter(|(_, amount)| **amount != 0)
            .map(|((token, holder), amount)| BalanceEntry {
                token: *token,
                holder: *holder,
                amount: *amount,
            })
            .collect();
        rows.sort_by(|a, b| (a.token, a.holder).cmp(&(b.token, b.holder)));
        rows
    }

    fn set(&mut self, token: Address, holder: Address, amount: u128) {
        self.balances.insert((token, holder), amount);
    }
}

impl TokenLedger for BalanceSheet {
    fn balance_of(&self, token: Address, holder: Address) -> u128 {
        self.balances.get(&(token, holder)).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(token, from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                token,
                holder: from,
                available,
                requested: amount,
            });
        }
        if from == to {
            return Ok(());
        }

        let current = self.balance_of(token, to);
        let credited = current.checked_add(amount).ok_or(LedgerError::Overflow {
            token,
            holder: to,
            current,
            credit: amount,
        })?;

        // Both legs validated; nothing below can fail.
        self.set(token, from, available - amount);
        self.set(token, to, credited);
        debug!(%token, %from, %to, amount, "transfer");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> Address {
        Address::from_low_u64_be(0x70)
    }
    fn alice() -> Address {
        Address::from_low_u64_be(0xa1)
    }
    fn bob() -> Address {
        Address::from_low_u64_be(0xb0)
    }

    #[test]
    fn unknown_pair_is_zero() {
        let sheet = BalanceSheet::new();
        assert_eq!(sheet.balance_of(token(), alice()), 0);
        assert!(sheet.entries().is_empty());
    }

    #[test]
    fn replayed_history_yields_equal_sheets() {
        let replay = || {
            let mut sheet = BalanceSheet::new();
            sheet.mint(token(), alice(), 1_000).unwrap();
            sheet.transfer(token(), alice(), bob(), 250).unwrap();
            sheet
        };
        let first = replay();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(first, replay());
    }

    #[test]
    fn mint_accumulates() {
        let mut sheet = BalanceSheet::new();
        sheet.mint(token(), alice(), 500).unwrap();
        assert_eq!(sheet.mint(token(), alice(), 250).unwrap(), 750);
        assert_eq!(sheet.total_supply(token()), 750);
    }

    #[test]
    fn mint_overflow_rejected() {
        let mut sheet = BalanceSheet::new();
        sheet.mint(token(), alice(), u128::MAX).unwrap();
        assert!(matches!(
            sheet.mint(token(), alice(), 1),
            Err(LedgerError::Overflow { .. })
        ));
        assert_eq!(sheet.balance_of(token(), alice()), u128::MAX);
    }

    #[test]
    fn transfer_moves_both_legs() {
        let mut sheet = BalanceSheet::new();
        sheet.mint(token(), alice(), 1_000).unwrap();
        sheet.transfer(token(), alice(), bob(), 400).unwrap();
        assert_eq!(sheet.balance_of(token(), alice()), 600);
        assert_eq!(sheet.balance_of(token(), bob()), 400);
        assert_eq!(sheet.total_supply(token()), 1_000);
    }

    #[test]
    fn overdraft_leaves_balances_untouched() {
        let mut sheet = BalanceSheet::new();
        sheet.mint(token(), alice(), 10).unwrap();
        let err = sheet.transfer(token(), alice(), bob(), 11).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                token: token(),
                holder: alice(),
                available: 10,
                requested: 11,
            }
        );
        assert_eq!(sheet.balance_of(token(), alice()), 10);
        assert_eq!(sheet.balance_of(token(), bob()), 0);
    }

    #[test]
    fn receiver_overflow_leaves_sender_untouched() {
        let mut sheet = BalanceSheet::new();
        sheet.mint(token(), alice(), 5).unwrap();
        sheet.mint(token(), bob(), u128::MAX).unwrap();
        assert!(sheet.transfer(token(), alice(), bob(), 5).is_err());
        assert_eq!(sheet.balance_of(token(), alice()), 5);
    }

    #[test]
    fn self_transfer_is_noop() {
        let mut sheet = BalanceSheet::new();
        sheet.mint(token(), alice(), 10).unwrap();
        sheet.transfer(token(), alice(), alice(), 10).unwrap();
        assert_eq!(sheet.balance_of(token(), alice()), 10);
    }

    #[test]
    fn entries_skip_zero_and_sort() {
        let mut sheet = BalanceSheet::new();
        sheet.mint(token(), bob(), 3).unwrap();
        sheet.mint(token(), alice(), 2).unwrap();
        sheet.transfer(token(), bob(), alice(), 3).unwrap();
        let rows = sheet.entries();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].holder, alice());
        assert_eq!(rows[0].amount, 5);
    }
}

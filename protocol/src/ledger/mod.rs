//! # Token Ledger: The Value-Transfer Primitive
//!
//! The vault never owns money directly; it owns a *balance* in a token
//! ledger and asks the ledger to move it. This module defines the seam
//! ([`TokenLedger`]) and the in-memory implementation the rest of the
//! workspace runs on ([`BalanceSheet`]).
//!
//! ## Contract
//!
//! 1. **All amounts are `u128` in smallest-unit denomination.** No floats.
//! 2. **Transfers are all-or-nothing.** Either both legs apply or neither
//!    does, and a failed transfer leaves every balance untouched.
//! 3. **Failures are loud.** Overdrafts return an error; they never clamp.

pub mod amount;
pub mod balance;

use thiserror::Error;

use crate::address::Address;

pub use balance::{BalanceEntry, BalanceSheet};

/// Errors that can occur while moving tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The sender does not hold enough of the token.
    #[error(
        "insufficient balance: {holder} holds {available} of token {token}, requested {requested}"
    )]
    InsufficientBalance {
        /// Token being moved.
        token: Address,
        /// Account being debited.
        holder: Address,
        /// Its current balance.
        available: u128,
        /// The amount requested.
        requested: u128,
    },

    /// Crediting would overflow the receiver's balance.
    #[error("balance overflow: {holder} holds {current} of token {token}, credit {credit}")]
    Overflow {
        /// Token being moved.
        token: Address,
        /// Account being credited.
        holder: Address,
        /// Its current balance.
        current: u128,
        /// The amount that caused the overflow.
        credit: u128,
    },
}

/// A ledger of fungible token balances.
pub trait TokenLedger {
    /// Balance of `holder` in `token`. Unknown pairs hold zero.
    fn balance_of(&self, token: Address, holder: Address) -> u128;

    /// Moves `amount` of `token` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientBalance`] or [`LedgerError::Overflow`];
    /// on error no balance changes.
    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), LedgerError>;
}

//! # Withdrawal Rate Limiter
//!
//! A withdrawal moves at most `max_amount` and may happen at most once per
//! `waiting_period`. The state is a single timestamp: when the last
//! successful withdrawal happened. It starts at the vault's creation time,
//! so a freshly created vault has to wait one full period before its first
//! withdrawal.
//!
//! The manager splits the operation into [`check`](WithdrawalManager::check)
//! and [`record`](WithdrawalManager::record) so that the caller can run the
//! token transfer in between: check, transfer, record. If the transfer
//! fails, nothing was recorded.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use warden_protocol::config::{DEFAULT_WAITING_PERIOD, DEFAULT_WITHDRAWAL_LIMIT};
use warden_protocol::ledger::TokenLedger;
use warden_protocol::Address;

use crate::error::VaultError;

/// Withdrawal cap and cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalLimits {
    /// Maximum amount per withdrawal, in smallest units.
    #[serde(with = "warden_protocol::ledger::amount")]
    pub max_amount: u128,
    /// Minimum time between two successful withdrawals.
    #[serde(with = "duration_secs")]
    pub waiting_period: Duration,
}

impl WithdrawalLimits {
    /// Builds limits from a cap and a std duration.
    pub fn new(max_amount: u128, waiting_period: StdDuration) -> Self {
        Self {
            max_amount,
            waiting_period: Duration::from_std(waiting_period).unwrap_or(Duration::MAX),
        }
    }
}

impl Default for WithdrawalLimits {
    fn default() -> Self {
        Self::new(DEFAULT_WITHDRAWAL_LIMIT, DEFAULT_WAITING_PERIOD)
    }
}

/// Rate-limit state machine for one vault.
#[derive(Debug, Clone)]
pub struct WithdrawalManager {
    limits: WithdrawalLimits,
    last_withdrawal: DateTime<Utc>,
}

impl WithdrawalManager {
    /// Creates a manager whose last withdrawal is `created_at`.
    pub fn new(limits: WithdrawalLimits, created_at: DateTime<Utc>) -> Self {
        Self {
            limits,
            last_withdrawal: created_at,
        }
    }

    /// The configured limits.
    pub fn limits(&self) -> &WithdrawalLimits {
        &self.limits
    }

    /// Timestamp of the last successful withdrawal.
    pub fn last_withdrawal(&self) -> DateTime<Utc> {
        self.last_withdrawal
    }

    /// Earliest time at which the next withdrawal may succeed.
    pub fn next_allowed(&self) -> DateTime<Utc> {
        self.last_withdrawal
            .checked_add_signed(self.limits.waiting_period)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Validates a withdrawal of `amount` at `now` without changing state.
    ///
    /// # Errors
    ///
    /// [`VaultError::AmountExceedsLimit`] if `amount` is above the cap,
    /// [`VaultError::RateLimited`] if the waiting period has not elapsed.
    pub fn check(&self, amount: u128, now: DateTime<Utc>) -> Result<(), VaultError> {
        if amount > self.limits.max_amount {
            return Err(VaultError::AmountExceedsLimit {
                requested: amount,
                limit: self.limits.max_amount,
            });
        }
        let next_allowed = self.next_allowed();
        if now < next_allowed {
            debug!(%now, %next_allowed, "withdrawal inside waiting period");
            return Err(VaultError::RateLimited { next_allowed });
        }
        Ok(())
    }

    /// Records a successful withdrawal at `now`. The timestamp never moves
    /// backwards.
    pub fn record(&mut self, now: DateTime<Utc>) {
        if now > self.last_withdrawal {
            self.last_withdrawal = now;
        }
    }

    /// Check, transfer from `vault` to `recipient`, record.
    ///
    /// The transfer is the only step that can fail after the check, and it
    /// is all-or-nothing, so on any error the manager and the ledger are
    /// exactly as they were.
    pub fn withdraw<L: TokenLedger>(
        &mut self,
        ledger: &mut L,
        vault: Address,
        token: Address,
        recipient: Address,
        amount: u128,
        now: DateTime<Utc>,
    ) -> Result<(), VaultError> {
        self.check(amount, now)?;
        ledger.transfer(token, vault, recipient, amount)?;
        self.record(now);
        Ok(())
    }
}

mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        let secs = i64::try_from(secs).map_err(serde::de::Error::custom)?;
        Duration::try_seconds(secs)
            .ok_or_else(|| serde::de::Error::custom("waiting period out of range"))
    }
}

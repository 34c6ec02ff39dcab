//! Error type for every vault operation.

use chrono::{DateTime, Utc};
use thiserror::Error;

use warden_protocol::abi::{AbiError, Selector};
use warden_protocol::ledger::LedgerError;
use warden_protocol::Address;

/// Errors that can occur during vault operations.
///
/// The variants are deliberately distinct: a caller must be able to tell
/// "you may not" from "not yet" from "the operation itself failed" without
/// parsing messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// The `(selector, principal, target)` triple is not granted, or a
    /// privileged operation was called from outside the dispatcher.
    #[error("unauthorized: {principal} may not call {selector} on {target}")]
    Unauthorized {
        /// The operation that was attempted.
        selector: Selector,
        /// Who attempted it.
        principal: Address,
        /// The target it was attempted on.
        target: Address,
    },

    /// A withdrawal was attempted before the waiting period elapsed.
    #[error("rate limited: next withdrawal allowed at {next_allowed}")]
    RateLimited {
        /// Earliest time at which a withdrawal can succeed.
        next_allowed: DateTime<Utc>,
    },

    /// A withdrawal asked for more than the per-withdrawal limit.
    #[error("withdrawal amount {requested} exceeds limit {limit}")]
    AmountExceedsLimit {
        /// Amount requested.
        requested: u128,
        /// Configured maximum.
        limit: u128,
    },

    /// Permissions were already set.
    #[error("permissions already initialized")]
    AlreadyInitialized,

    /// The payload could not be decoded.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] AbiError),

    /// The call named a target this vault cannot forward to.
    #[error("unknown call target {0}")]
    UnknownTarget(Address),

    /// The token ledger refused a transfer.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The forwarded call failed; `source` is the callee's error, unchanged.
    #[error("call to {selector} failed: {source}")]
    CalleeFailed {
        /// The operation that was forwarded.
        selector: Selector,
        /// What the operation returned.
        #[source]
        source: Box<VaultError>,
    },
}

impl VaultError {
    /// Follows `CalleeFailed` wrappers down to the error that started it.
    pub fn root_cause(&self) -> &VaultError {
        match self {
            VaultError::CalleeFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Stable snake_case tag for machine-readable output.
    pub fn kind(&self) -> &'static str {
        match self {
            VaultError::Unauthorized { .. } => "unauthorized",
            VaultError::RateLimited { .. } => "rate_limited",
            VaultError::AmountExceedsLimit { .. } => "amount_exceeds_limit",
            VaultError::AlreadyInitialized => "already_initialized",
            VaultError::MalformedPayload(_) => "malformed_payload",
            VaultError::UnknownTarget(_) => "unknown_target",
            VaultError::Ledger(_) => "ledger",
            VaultError::CalleeFailed { .. } => "callee_failed",
        }
    }
}

//! # Warden Vault Contracts
//!
//! A vault that holds tokens and exposes exactly two privileged operations,
//! both behind one gated front door:
//!
//! - **Withdraw**: move at most `max_amount` of a token to a recipient,
//!   at most once per waiting period.
//! - **Sweep**: move the vault's *entire* balance of a token to a receiver.
//!   No cap, no cooldown. It exists for emergencies.
//!
//! Nobody calls either operation directly. Callers go through
//! [`Vault::execute`](vault::Vault::execute), which decodes the payload into
//! an [`Action`](action::Action), derives the [`ActionId`](permission::ActionId)
//! for `(selector, caller, target)`, checks it against the
//! [`PermissionRegistry`](permission::PermissionRegistry), and only then
//! forwards the *same decoded action* to the operation as a self-call.
//!
//! ## Design Principles
//!
//! 1. The payload is decoded once. The bytes that were authorized are the
//!    bytes that run, because there is only one parsed value to run.
//! 2. Privileged operations check their call origin, not their caller's
//!    claimed address. Only the dispatcher can mint a self-call origin.
//! 3. Every check runs before the first mutation. A failed call changes
//!    nothing.
//! 4. State transitions are explicit and every amount is checked.

pub mod action;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod permission;
pub mod sweep;
pub mod vault;
pub mod withdrawal;

pub use action::{Action, ExecuteCall, SweepArgs, WithdrawArgs};
pub use dispatcher::{AuthorizedCall, CallContext, Dispatcher};
pub use error::VaultError;
pub use events::VaultEvent;
pub use permission::{ActionId, PermissionRegistry};
pub use vault::Vault;
pub use withdrawal::{WithdrawalLimits, WithdrawalManager};

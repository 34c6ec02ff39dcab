//! # The Vault Aggregate
//!
//! One owned value holding everything the dispatcher and the privileged
//! operations touch: the permission registry, the withdrawal state, the
//! token ledger, the clock and the event log. Every operation takes
//! `&mut self`, so calls are serialized by construction.
//!
//! ## Lifecycle
//!
//! ```text
//! Vault::new ──► init(permissions) ──► deposit(..) ──► execute(..)*
//! ```
//!
//! `execute` may be called before `init`; with an empty registry every call
//! is simply unauthorized.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use warden_protocol::abi::Selector;
use warden_protocol::clock::{Clock, SystemClock};
use warden_protocol::ledger::{BalanceSheet, TokenLedger};
use warden_protocol::Address;

use crate::action::{canonical_position_selector, Action, ExecuteCall};
use crate::dispatcher::{AuthorizedCall, CallContext, Dispatcher};
use crate::error::VaultError;
use crate::events::VaultEvent;
use crate::permission::{ActionId, PermissionRegistry};
use crate::sweep::SweepManager;
use crate::withdrawal::{WithdrawalLimits, WithdrawalManager};

/// A token vault behind a capability-gated dispatcher.
#[derive(Debug)]
pub struct Vault<L: TokenLedger = BalanceSheet, C: Clock = SystemClock> {
    address: Address,
    registry: PermissionRegistry,
    withdrawals: WithdrawalManager,
    sweeper: SweepManager,
    ledger: L,
    clock: C,
    events: Vec<VaultEvent>,
}

impl<L: TokenLedger, C: Clock> Vault<L, C> {
    /// Creates an uninitialized vault at `address`.
    ///
    /// The withdrawal clock starts now: the first withdrawal is possible one
    /// waiting period after creation.
    pub fn new(address: Address, limits: WithdrawalLimits, ledger: L, clock: C) -> Self {
        let created_at = clock.now();
        info!(
            %address,
            max_amount = limits.max_amount,
            waiting_period_secs = limits.waiting_period.num_seconds(),
            "vault created"
        );
        Self {
            address,
            registry: PermissionRegistry::new(),
            withdrawals: WithdrawalManager::new(limits, created_at),
            sweeper: SweepManager,
            ledger,
            clock,
            events: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Initialization
    // -----------------------------------------------------------------------

    /// Grants `permissions`. Callable once.
    ///
    /// # Errors
    ///
    /// [`VaultError::AlreadyInitialized`] on a second call.
    pub fn init<I>(&mut self, ctx: &CallContext, permissions: I) -> Result<Vec<ActionId>, VaultError>
    where
        I: IntoIterator<Item = ActionId>,
    {
        let who = ctx.principal(self.address);
        let ids = self.registry.init(permissions).map_err(|e| {
            warn!(%who, "permissions already initialized");
            e
        })?;
        info!(%who, granted = ids.len(), "permissions initialized");
        self.events.push(VaultEvent::Initialized {
            who,
            ids: ids.clone(),
        });
        Ok(ids)
    }

    // -----------------------------------------------------------------------
    // Gated entry points
    // -----------------------------------------------------------------------

    /// Runs the action encoded in `payload` on `target`, if the caller holds
    /// the matching permission.
    ///
    /// Returns the callee's return data, which is empty for both operations.
    ///
    /// # Errors
    ///
    /// [`VaultError::MalformedPayload`], [`VaultError::Unauthorized`],
    /// [`VaultError::UnknownTarget`] or [`VaultError::CalleeFailed`]. On any
    /// error no state has changed.
    pub fn execute(
        &mut self,
        ctx: &CallContext,
        target: Address,
        payload: &[u8],
    ) -> Result<Bytes, VaultError> {
        let principal = ctx.principal(self.address);
        let authorized =
            Dispatcher::new(&self.registry).decode_and_authorize(principal, target, payload)?;
        self.forward(authorized)
    }

    /// Entry point for raw `execute(address,bytes)` calldata.
    ///
    /// The envelope is decoded by following its offset, the embedded action
    /// is decoded once, and the result goes through the same path as
    /// [`execute`](Self::execute). Payloads whose canonical selector slot
    /// disagrees with what the decoder found are logged as smuggling
    /// attempts; the log line has no effect on the outcome.
    pub fn handle_calldata(
        &mut self,
        ctx: &CallContext,
        calldata: &[u8],
    ) -> Result<Bytes, VaultError> {
        let call = ExecuteCall::decode(calldata)?;
        let action = Action::decode(&call.action_data)?;

        let slot = canonical_position_selector(calldata);
        if !call.is_canonical() || slot != Some(action.selector()) {
            warn!(
                principal = %ctx.principal(self.address),
                offset = call.action_offset,
                decoded = %action.selector(),
                canonical_slot = ?slot,
                "non-canonical execute envelope"
            );
        }

        self.execute_action(ctx, call.target, action)
    }

    fn execute_action(
        &mut self,
        ctx: &CallContext,
        target: Address,
        action: Action,
    ) -> Result<Bytes, VaultError> {
        let principal = ctx.principal(self.address);
        let authorized = Dispatcher::new(&self.registry).authorize(principal, target, action)?;
        self.forward(authorized)
    }

    /// Self-directed call of an authorized action.
    fn forward(&mut self, call: AuthorizedCall) -> Result<Bytes, VaultError> {
        if call.target() != self.address {
            return Err(VaultError::UnknownTarget(call.target()));
        }
        let ctx = CallContext::self_call();
        let selector = call.action().selector();
        let result = match call.into_action() {
            Action::Withdraw(args) => self.withdraw(&ctx, args.token, args.recipient, args.amount),
            Action::Sweep(args) => self.sweep_funds(&ctx, args.receiver, args.token),
        };
        result
            .map(|()| Bytes::new())
            .map_err(|source| VaultError::CalleeFailed {
                selector,
                source: Box::new(source),
            })
    }

    // -----------------------------------------------------------------------
    // Privileged operations (self-call only)
    // -----------------------------------------------------------------------

    /// Withdraws up to the limit, at most once per waiting period.
    ///
    /// # Errors
    ///
    /// [`VaultError::Unauthorized`] unless called through
    /// [`execute`](Self::execute); otherwise
    /// [`VaultError::AmountExceedsLimit`], [`VaultError::RateLimited`] or
    /// [`VaultError::Ledger`].
    pub fn withdraw(
        &mut self,
        ctx: &CallContext,
        token: Address,
        recipient: Address,
        amount: u128,
    ) -> Result<(), VaultError> {
        self.require_self_call(ctx, Selector::WITHDRAW)?;
        let now = self.clock.now();
        self.withdrawals
            .withdraw(&mut self.ledger, self.address, token, recipient, amount, now)?;
        info!(%token, %recipient, amount, at = %now, "withdrawal");
        self.events.push(VaultEvent::Withdrawal {
            token,
            recipient,
            amount,
            at: now,
        });
        Ok(())
    }

    /// Moves the vault's whole balance of `token` to `receiver`.
    ///
    /// # Errors
    ///
    /// [`VaultError::Unauthorized`] unless called through
    /// [`execute`](Self::execute); [`VaultError::Ledger`] if the transfer
    /// is refused.
    pub fn sweep_funds(
        &mut self,
        ctx: &CallContext,
        receiver: Address,
        token: Address,
    ) -> Result<(), VaultError> {
        self.require_self_call(ctx, Selector::SWEEP)?;
        let now = self.clock.now();
        let amount = self
            .sweeper
            .sweep(&mut self.ledger, self.address, receiver, token)?;
        info!(%token, %receiver, amount, "funds swept");
        self.events.push(VaultEvent::Sweep {
            token,
            receiver,
            amount,
            at: now,
        });
        Ok(())
    }

    fn require_self_call(&self, ctx: &CallContext, selector: Selector) -> Result<(), VaultError> {
        if ctx.is_self_call() {
            return Ok(());
        }
        let principal = ctx.principal(self.address);
        warn!(%selector, %principal, "direct call to privileged operation");
        Err(VaultError::Unauthorized {
            selector,
            principal,
            target: self.address,
        })
    }

    // -----------------------------------------------------------------------
    // Funding
    // -----------------------------------------------------------------------

    /// Moves `amount` of `token` from `from` into the vault.
    ///
    /// # Errors
    ///
    /// [`VaultError::Ledger`] if `from` cannot cover it.
    pub fn deposit(&mut self, from: Address, token: Address, amount: u128) -> Result<(), VaultError> {
        self.ledger.transfer(token, from, self.address, amount)?;
        info!(%from, %token, amount, "deposit");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The vault's own address, the only valid `execute` target.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Whether permissions have been set.
    pub fn is_initialized(&self) -> bool {
        self.registry.is_initialized()
    }

    /// Whether `id` is granted.
    pub fn is_permitted(&self, id: &ActionId) -> bool {
        self.registry.is_permitted(id)
    }

    /// The id for `principal` invoking `selector` on `target`.
    pub fn action_id(&self, selector: Selector, principal: Address, target: Address) -> ActionId {
        ActionId::derive(selector, principal, target)
    }

    /// The permission registry.
    pub fn registry(&self) -> &PermissionRegistry {
        &self.registry
    }

    /// Timestamp of the last successful withdrawal (creation time if none).
    pub fn last_withdrawal_timestamp(&self) -> DateTime<Utc> {
        self.withdrawals.last_withdrawal()
    }

    /// Withdrawal cap and cooldown.
    pub fn limits(&self) -> &WithdrawalLimits {
        self.withdrawals.limits()
    }

    /// `holder`'s balance of `token`.
    pub fn balance_of(&self, token: Address, holder: Address) -> u128 {
        self.ledger.balance_of(token, holder)
    }

    /// The vault's own balance of `token`.
    pub fn balance(&self, token: Address) -> u128 {
        self.ledger.balance_of(token, self.address)
    }

    /// Everything that has happened, oldest first.
    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    /// The ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable ledger access, for funding from outside the system.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// The clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

//! # Dispatcher: The Gated Front Door
//!
//! Authorization works on a decoded [`Action`], never on bytes:
//!
//! 1. The payload is decoded into an `Action` (by the caller of
//!    [`Dispatcher::authorize`], or by [`Dispatcher::decode_and_authorize`]).
//! 2. `ActionId::derive(action.selector(), principal, target)`.
//! 3. The registry must contain that id.
//! 4. The result is an [`AuthorizedCall`] that *owns* the action.
//!
//! `AuthorizedCall` has no public constructor, and the vault's forwarding
//! path accepts nothing else. The action that runs is therefore the action
//! that was checked; there is no second buffer to re-read.
//!
//! [`CallContext`] carries the authenticated caller. External callers are
//! built with [`CallContext::external`]; the self-call origin that the
//! privileged operations require can only be created inside this crate.

use tracing::{debug, warn};

use warden_protocol::Address;

use crate::action::Action;
use crate::error::VaultError;
use crate::permission::{ActionId, PermissionRegistry};

/// Where a call came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// An authenticated principal outside the vault.
    External(Address),
    /// The vault calling itself through the dispatcher.
    SelfCall,
}

/// Authenticated identity of the current call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    origin: Origin,
}

impl CallContext {
    /// A call made by `principal` from outside the vault.
    ///
    /// Claiming the vault's own address here does not make a call a
    /// self-call; only the dispatcher can do that.
    pub fn external(principal: Address) -> Self {
        Self {
            origin: Origin::External(principal),
        }
    }

    pub(crate) fn self_call() -> Self {
        Self {
            origin: Origin::SelfCall,
        }
    }

    /// `true` only for calls forwarded by the dispatcher.
    pub fn is_self_call(&self) -> bool {
        self.origin == Origin::SelfCall
    }

    /// The address this call acts as, given the vault it runs in.
    pub fn principal(&self, vault: Address) -> Address {
        match self.origin {
            Origin::External(principal) => principal,
            Origin::SelfCall => vault,
        }
    }
}

/// A decoded action that passed the permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedCall {
    action: Action,
    principal: Address,
    target: Address,
    id: ActionId,
}

impl AuthorizedCall {
    /// The action that will run.
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Who is running it.
    pub fn principal(&self) -> Address {
        self.principal
    }

    /// Where it will run.
    pub fn target(&self) -> Address {
        self.target
    }

    /// The grant that allowed it.
    pub fn id(&self) -> ActionId {
        self.id
    }

    /// Consumes the authorization, yielding the action.
    pub fn into_action(self) -> Action {
        self.action
    }
}

/// Permission check over one registry.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'r> {
    registry: &'r PermissionRegistry,
}

impl<'r> Dispatcher<'r> {
    /// Creates a dispatcher reading `registry`.
    pub fn new(registry: &'r PermissionRegistry) -> Self {
        Self { registry }
    }

    /// Authorizes `principal` to run `action` on `target`.
    ///
    /// # Errors
    ///
    /// [`VaultError::Unauthorized`] if the derived id is not granted.
    pub fn authorize(
        &self,
        principal: Address,
        target: Address,
        action: Action,
    ) -> Result<AuthorizedCall, VaultError> {
        let selector = action.selector();
        let id = ActionId::derive(selector, principal, target);
        if !self.registry.is_permitted(&id) {
            warn!(%selector, %principal, %target, action_id = %id, "permission denied");
            return Err(VaultError::Unauthorized {
                selector,
                principal,
                target,
            });
        }
        debug!(%selector, %principal, %target, action_id = %id, "permission granted");
        Ok(AuthorizedCall {
            action,
            principal,
            target,
            id,
        })
    }

    /// Decodes `payload` and authorizes the result.
    ///
    /// # Errors
    ///
    /// [`VaultError::MalformedPayload`] if decoding fails, otherwise as
    /// [`authorize`](Self::authorize).
    pub fn decode_and_authorize(
        &self,
        principal: Address,
        target: Address,
        payload: &[u8],
    ) -> Result<AuthorizedCall, VaultError> {
        let action = Action::decode(payload)?;
        self.authorize(principal, target, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{SweepArgs, WithdrawArgs};
    use warden_protocol::abi::Selector;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn withdraw() -> Action {
        Action::Withdraw(WithdrawArgs {
            token: addr(0x70),
            recipient: addr(0x91),
            amount: 1,
        })
    }

    fn sweep() -> Action {
        Action::Sweep(SweepArgs {
            receiver: addr(0x91),
            token: addr(0x70),
        })
    }

    fn registry_with(ids: &[ActionId]) -> PermissionRegistry {
        let mut registry = PermissionRegistry::new();
        registry.init(ids.iter().copied()).unwrap();
        registry
    }

    #[test]
    fn external_context_is_never_a_self_call() {
        let vault = addr(0x7a);
        let ctx = CallContext::external(vault);
        assert!(!ctx.is_self_call());
        assert_eq!(ctx.principal(vault), vault);
        assert!(CallContext::self_call().is_self_call());
        assert_eq!(CallContext::self_call().principal(vault), vault);
    }

    #[test]
    fn authorized_call_owns_the_checked_action() {
        let registry = registry_with(&[ActionId::derive(Selector::WITHDRAW, addr(1), addr(2))]);
        let call = Dispatcher::new(&registry)
            .authorize(addr(1), addr(2), withdraw())
            .unwrap();
        assert_eq!(call.action(), &withdraw());
        assert_eq!(call.principal(), addr(1));
        assert_eq!(call.target(), addr(2));
        assert_eq!(
            call.id(),
            ActionId::derive(Selector::WITHDRAW, addr(1), addr(2))
        );
    }

    #[test]
    fn grant_does_not_transfer_across_selectors() {
        let registry = registry_with(&[ActionId::derive(Selector::WITHDRAW, addr(1), addr(2))]);
        let err = Dispatcher::new(&registry)
            .authorize(addr(1), addr(2), sweep())
            .unwrap_err();
        assert_eq!(
            err,
            VaultError::Unauthorized {
                selector: Selector::SWEEP,
                principal: addr(1),
                target: addr(2),
            }
        );
    }

    #[test]
    fn grant_does_not_transfer_across_principals_or_targets() {
        let registry = registry_with(&[ActionId::derive(Selector::WITHDRAW, addr(1), addr(2))]);
        let dispatcher = Dispatcher::new(&registry);
        assert!(dispatcher.authorize(addr(9), addr(2), withdraw()).is_err());
        assert!(dispatcher.authorize(addr(1), addr(9), withdraw()).is_err());
    }

    #[test]
    fn malformed_payload_is_rejected_before_lookup() {
        let registry = registry_with(&[]);
        let err = Dispatcher::new(&registry)
            .decode_and_authorize(addr(1), addr(2), &[0xd9, 0xca])
            .unwrap_err();
        assert!(matches!(err, VaultError::MalformedPayload(_)));
    }

    #[test]
    fn decode_and_authorize_uses_the_payload_selector() {
        let registry = registry_with(&[ActionId::derive(Selector::SWEEP, addr(1), addr(2))]);
        let call = Dispatcher::new(&registry)
            .decode_and_authorize(addr(1), addr(2), &sweep().encode())
            .unwrap();
        assert_eq!(call.into_action(), sweep());
    }
}

//! Integration tests for the vault.
//!
//! These drive the vault through its public entry points only: raw
//! `execute` calldata, `execute(target, payload)`, and direct calls to the
//! privileged operations. Time is a shared `ManualClock`.

use std::time::Duration as StdDuration;

use chrono::{Duration, TimeZone, Utc};
use warden_contracts::{
    Action, ActionId, CallContext, ExecuteCall, SweepArgs, Vault, VaultError, VaultEvent,
    WithdrawArgs, WithdrawalLimits,
};
use warden_protocol::abi::Selector;
use warden_protocol::clock::{Clock, ManualClock};
use warden_protocol::ledger::{BalanceSheet, LedgerError, TokenLedger};
use warden_protocol::Address;

const ONE: u128 = 1_000_000_000_000_000_000;

fn vault_addr() -> Address {
    Address::from_low_u64_be(0x7a017)
}
fn token() -> Address {
    Address::from_low_u64_be(0x70c3)
}
fn deployer() -> Address {
    Address::from_low_u64_be(0xde)
}
fn sweeper() -> Address {
    Address::from_low_u64_be(0x5eee)
}
fn player() -> Address {
    Address::from_low_u64_be(0x91a7)
}
fn recovery() -> Address {
    Address::from_low_u64_be(0xec0)
}

/// Vault holding `balance`, with `withdraw` granted to the player and
/// `sweepFunds` granted to the sweeper.
fn setup(
    balance: u128,
    limits: WithdrawalLimits,
) -> (Vault<BalanceSheet, ManualClock>, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
    let mut vault = Vault::new(vault_addr(), limits, BalanceSheet::new(), clock.clone());
    vault.ledger_mut().mint(token(), deployer(), balance).unwrap();
    vault.deposit(deployer(), token(), balance).unwrap();
    vault
        .init(
            &CallContext::external(deployer()),
            [
                ActionId::derive(Selector::WITHDRAW, player(), vault_addr()),
                ActionId::derive(Selector::SWEEP, sweeper(), vault_addr()),
            ],
        )
        .unwrap();
    (vault, clock)
}

fn default_setup() -> (Vault<BalanceSheet, ManualClock>, ManualClock) {
    setup(10 * ONE, WithdrawalLimits::default())
}

fn withdraw_payload(recipient: Address, amount: u128) -> Vec<u8> {
    Action::Withdraw(WithdrawArgs {
        token: token(),
        recipient,
        amount,
    })
    .encode()
    .to_vec()
}

fn sweep_payload(receiver: Address) -> Vec<u8> {
    Action::Sweep(SweepArgs {
        receiver,
        token: token(),
    })
    .encode()
    .to_vec()
}

fn word(bytes: &[u8]) -> [u8; 32] {
    let mut w = [0u8; 32];
    w[32 - bytes.len()..].copy_from_slice(bytes);
    w
}

/// `execute` calldata whose `data` offset points past a decoy: a `withdraw`
/// selector sits where canonical encoders put the action selector, while
/// the offset leads to a `sweepFunds` call.
fn smuggled_calldata(receiver: Address) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(Selector::EXECUTE.as_bytes());
    out.extend_from_slice(&vault_addr().to_word());
    out.extend_from_slice(&word(&[0x80]));
    out.extend_from_slice(&[0u8; 32]);
    let mut decoy = [0u8; 32];
    decoy[..4].copy_from_slice(Selector::WITHDRAW.as_bytes());
    out.extend_from_slice(&decoy);
    let hidden = sweep_payload(receiver);
    out.extend_from_slice(&word(&[hidden.len() as u8]));
    out.extend_from_slice(&hidden);
    out
}

// ---------------------------------------------------------------------------
// Smuggling
// ---------------------------------------------------------------------------

#[test]
fn smuggled_sweep_is_rejected() {
    let (mut vault, clock) = default_setup();
    clock.advance(Duration::days(16));
    let calldata = smuggled_calldata(recovery());
    assert_eq!(&calldata[100..104], Selector::WITHDRAW.as_bytes());

    let err = vault
        .handle_calldata(&CallContext::external(player()), &calldata)
        .unwrap_err();

    assert_eq!(
        err,
        VaultError::Unauthorized {
            selector: Selector::SWEEP,
            principal: player(),
            target: vault_addr(),
        }
    );
    assert_eq!(vault.balance(token()), 10 * ONE);
    assert_eq!(vault.balance_of(token(), recovery()), 0);
    assert_eq!(vault.events().len(), 1);
}

#[test]
fn smuggled_envelope_decodes_to_the_action_that_runs() {
    let calldata = smuggled_calldata(recovery());
    let call = ExecuteCall::decode(&calldata).unwrap();
    assert!(!call.is_canonical());
    assert_eq!(
        Action::decode(&call.action_data).unwrap(),
        Action::Sweep(SweepArgs {
            receiver: recovery(),
            token: token(),
        })
    );
}

#[test]
fn smuggled_sweep_runs_for_a_principal_that_holds_sweep() {
    let (mut vault, _) = default_setup();
    vault
        .handle_calldata(&CallContext::external(sweeper()), &smuggled_calldata(recovery()))
        .unwrap();
    assert_eq!(vault.balance(token()), 0);
    assert_eq!(vault.balance_of(token(), recovery()), 10 * ONE);
}

#[test]
fn truncated_calldata_is_malformed() {
    let (mut vault, _) = default_setup();
    let calldata = smuggled_calldata(recovery());
    let err = vault
        .handle_calldata(&CallContext::external(player()), &calldata[..140])
        .unwrap_err();
    assert!(matches!(err, VaultError::MalformedPayload(_)));
}

// ---------------------------------------------------------------------------
// Rate-limited withdrawal
// ---------------------------------------------------------------------------

#[test]
fn hundred_daily_withdrawals() {
    let limits = WithdrawalLimits::new(10 * ONE, StdDuration::from_secs(86_400));
    let (mut vault, clock) = setup(1_000_000 * ONE, limits);
    let ctx = CallContext::external(player());

    for _ in 0..100 {
        clock.advance(Duration::days(1));
        vault
            .execute(&ctx, vault_addr(), &withdraw_payload(player(), 10 * ONE))
            .unwrap();
    }

    assert_eq!(vault.balance(token()), 999_000 * ONE);
    assert_eq!(vault.balance_of(token(), player()), 1_000 * ONE);
    assert_eq!(vault.last_withdrawal_timestamp(), clock.now());
}

#[test]
fn withdrawal_inside_period_is_rate_limited() {
    let (mut vault, clock) = default_setup();
    let ctx = CallContext::external(player());
    clock.advance(Duration::days(15));
    vault
        .execute(&ctx, vault_addr(), &withdraw_payload(player(), ONE))
        .unwrap();
    let first = clock.now();

    clock.advance(Duration::days(15) - Duration::seconds(1));
    let err = vault
        .execute(&ctx, vault_addr(), &withdraw_payload(player(), ONE))
        .unwrap_err();
    assert_eq!(
        err.root_cause(),
        &VaultError::RateLimited {
            next_allowed: first + Duration::days(15),
        }
    );
    assert_eq!(err.kind(), "callee_failed");

    clock.advance(Duration::seconds(1));
    vault
        .execute(&ctx, vault_addr(), &withdraw_payload(player(), ONE))
        .unwrap();
    assert_eq!(vault.balance_of(token(), player()), 2 * ONE);
}

#[test]
fn first_withdrawal_waits_from_creation() {
    let (mut vault, clock) = default_setup();
    clock.advance(Duration::days(14));
    let err = vault
        .execute(
            &CallContext::external(player()),
            vault_addr(),
            &withdraw_payload(player(), 1),
        )
        .unwrap_err();
    assert!(matches!(err.root_cause(), VaultError::RateLimited { .. }));
}

#[test]
fn withdrawal_above_cap_changes_nothing() {
    let (mut vault, clock) = default_setup();
    clock.advance(Duration::days(20));
    let before = vault.last_withdrawal_timestamp();
    let err = vault
        .execute(
            &CallContext::external(player()),
            vault_addr(),
            &withdraw_payload(player(), ONE + 1),
        )
        .unwrap_err();
    assert_eq!(
        err,
        VaultError::CalleeFailed {
            selector: Selector::WITHDRAW,
            source: Box::new(VaultError::AmountExceedsLimit {
                requested: ONE + 1,
                limit: ONE,
            }),
        }
    );
    assert_eq!(vault.last_withdrawal_timestamp(), before);
    assert_eq!(vault.balance(token()), 10 * ONE);
}

#[test]
fn failed_transfer_does_not_start_cooldown() {
    let (mut vault, clock) = setup(ONE / 2, WithdrawalLimits::default());
    clock.advance(Duration::days(15));
    let before = vault.last_withdrawal_timestamp();
    let err = vault
        .execute(
            &CallContext::external(player()),
            vault_addr(),
            &withdraw_payload(player(), ONE),
        )
        .unwrap_err();
    assert!(matches!(
        err.root_cause(),
        VaultError::Ledger(LedgerError::InsufficientBalance { .. })
    ));
    assert_eq!(vault.last_withdrawal_timestamp(), before);

    vault
        .execute(
            &CallContext::external(player()),
            vault_addr(),
            &withdraw_payload(player(), ONE / 2),
        )
        .unwrap();
    assert_eq!(vault.balance(token()), 0);
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

#[test]
fn player_cannot_sweep() {
    let (mut vault, _) = default_setup();
    let err = vault
        .execute(
            &CallContext::external(player()),
            vault_addr(),
            &sweep_payload(player()),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        VaultError::Unauthorized {
            selector: Selector::SWEEP,
            ..
        }
    ));
}

#[test]
fn sweeper_cannot_withdraw() {
    let (mut vault, clock) = default_setup();
    clock.advance(Duration::days(30));
    let err = vault
        .execute(
            &CallContext::external(sweeper()),
            vault_addr(),
            &withdraw_payload(sweeper(), 1),
        )
        .unwrap_err();
    assert_eq!(err.kind(), "unauthorized");
}

#[test]
fn sweeper_sweeps_everything_ignoring_limits() {
    let (mut vault, _) = default_setup();
    vault
        .execute(
            &CallContext::external(sweeper()),
            vault_addr(),
            &sweep_payload(recovery()),
        )
        .unwrap();
    assert_eq!(vault.balance(token()), 0);
    assert_eq!(vault.balance_of(token(), recovery()), 10 * ONE);
    assert!(matches!(
        vault.events().last(),
        Some(VaultEvent::Sweep { amount, .. }) if *amount == 10 * ONE
    ));

    // an empty vault sweeps zero and still succeeds
    vault
        .execute(
            &CallContext::external(sweeper()),
            vault_addr(),
            &sweep_payload(recovery()),
        )
        .unwrap();
    assert_eq!(vault.balance_of(token(), recovery()), 10 * ONE);
}

#[test]
fn direct_privileged_calls_are_unauthorized() {
    let (mut vault, clock) = default_setup();
    clock.advance(Duration::days(30));
    for caller in [player(), sweeper(), deployer(), vault_addr()] {
        let ctx = CallContext::external(caller);
        assert!(matches!(
            vault.withdraw(&ctx, token(), caller, 1),
            Err(VaultError::Unauthorized { selector: Selector::WITHDRAW, .. })
        ));
        assert!(matches!(
            vault.sweep_funds(&ctx, caller, token()),
            Err(VaultError::Unauthorized { selector: Selector::SWEEP, .. })
        ));
    }
    assert_eq!(vault.balance(token()), 10 * ONE);
}

#[test]
fn second_init_is_rejected() {
    let (mut vault, _) = default_setup();
    let extra = ActionId::derive(Selector::SWEEP, player(), vault_addr());
    assert_eq!(
        vault.init(&CallContext::external(player()), [extra]),
        Err(VaultError::AlreadyInitialized)
    );
    assert!(!vault.is_permitted(&extra));
    assert_eq!(vault.registry().len(), 2);
}

#[test]
fn foreign_target_is_not_permitted() {
    let (mut vault, clock) = default_setup();
    clock.advance(Duration::days(30));
    let err = vault
        .execute(
            &CallContext::external(player()),
            Address::from_low_u64_be(0xbad),
            &withdraw_payload(player(), 1),
        )
        .unwrap_err();
    assert_eq!(err.kind(), "unauthorized");
}

#[test]
fn canonical_calldata_and_execute_agree() {
    let (mut vault, clock) = default_setup();
    clock.advance(Duration::days(15));
    let calldata = ExecuteCall::encode(vault_addr(), &withdraw_payload(player(), ONE));
    vault
        .handle_calldata(&CallContext::external(player()), &calldata)
        .unwrap();
    assert_eq!(vault.balance_of(token(), player()), ONE);
    assert!(matches!(
        vault.events().last(),
        Some(VaultEvent::Withdrawal { recipient, amount, .. })
            if *recipient == player() && *amount == ONE
    ));
}

#[test]
fn total_supply_is_conserved() {
    let (mut vault, clock) = default_setup();
    clock.advance(Duration::days(15));
    vault
        .execute(
            &CallContext::external(player()),
            vault_addr(),
            &withdraw_payload(player(), ONE),
        )
        .unwrap();
    vault
        .execute(
            &CallContext::external(sweeper()),
            vault_addr(),
            &sweep_payload(recovery()),
        )
        .unwrap();
    assert_eq!(vault.ledger().total_supply(token()), 10 * ONE);
    assert_eq!(
        vault.ledger().balance_of(token(), player())
            + vault.ledger().balance_of(token(), recovery()),
        10 * ONE
    );
}

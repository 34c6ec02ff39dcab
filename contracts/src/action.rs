//! # Actions and the `execute` Envelope
//!
//! An [`Action`] is the closed set of things a vault can be asked to do.
//! It is produced by exactly one decoder, [`Action::decode`], and everything
//! downstream (the permission check, the operation itself, the event log)
//! reads fields off the resulting value. No code path goes back to the raw
//! bytes after this point.
//!
//! [`ExecuteCall`] is the outer layer: `execute(address target, bytes data)`
//! calldata as it arrives from a caller. Decoding it follows the `data`
//! offset the same way any callee would, so there is no second reading of
//! the envelope that could disagree with the first.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use warden_protocol::abi::{split_selector, AbiDecoder, AbiEncoder, AbiError, Selector};
use warden_protocol::config::{
    CANONICAL_ACTION_OFFSET, CANONICAL_ACTION_SELECTOR_POSITION, SELECTOR_LENGTH,
};
use warden_protocol::Address;

/// Arguments of `withdraw(address token, address recipient, uint256 amount)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawArgs {
    /// Token to withdraw.
    pub token: Address,
    /// Who receives it.
    pub recipient: Address,
    /// How much, in smallest units.
    #[serde(with = "warden_protocol::ledger::amount")]
    pub amount: u128,
}

/// Arguments of `sweepFunds(address receiver, address token)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepArgs {
    /// Who receives the full balance.
    pub receiver: Address,
    /// Token to sweep.
    pub token: Address,
}

/// A decoded vault operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Rate-limited withdrawal.
    Withdraw(WithdrawArgs),
    /// Full-balance sweep.
    Sweep(SweepArgs),
}

impl Action {
    /// Static head words of a `withdraw` call.
    pub const WITHDRAW_WORDS: usize = 3;
    /// Static head words of a `sweepFunds` call.
    pub const SWEEP_WORDS: usize = 2;

    /// The selector this action is invoked and authorized under.
    pub fn selector(&self) -> Selector {
        match self {
            Action::Withdraw(_) => Selector::WITHDRAW,
            Action::Sweep(_) => Selector::SWEEP,
        }
    }

    /// Decodes action calldata: selector followed by static arguments.
    ///
    /// # Errors
    ///
    /// Fails on a missing or unknown selector, on missing words, on bytes
    /// past the last argument, on dirty address padding and on amounts that
    /// don't fit 128 bits.
    pub fn decode(payload: &[u8]) -> Result<Self, AbiError> {
        let (selector, args) = split_selector(payload)?;
        let dec = AbiDecoder::new(args);
        match selector {
            Selector::WITHDRAW => {
                dec.expect_static_words(Self::WITHDRAW_WORDS)?;
                Ok(Action::Withdraw(WithdrawArgs {
                    token: dec.address(0)?,
                    recipient: dec.address(1)?,
                    amount: dec.uint128(2)?,
                }))
            }
            Selector::SWEEP => {
                dec.expect_static_words(Self::SWEEP_WORDS)?;
                Ok(Action::Sweep(SweepArgs {
                    receiver: dec.address(0)?,
                    token: dec.address(1)?,
                }))
            }
            other => Err(AbiError::UnknownSelector(other)),
        }
    }

    /// Canonical calldata for this action.
    pub fn encode(&self) -> Bytes {
        match self {
            Action::Withdraw(a) => AbiEncoder::new(Selector::WITHDRAW)
                .address(a.token)
                .address(a.recipient)
                .uint(a.amount)
                .finish(),
            Action::Sweep(a) => AbiEncoder::new(Selector::SWEEP)
                .address(a.receiver)
                .address(a.token)
                .finish(),
        }
    }
}

/// Decoded `execute(address,bytes)` calldata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteCall {
    /// Where the action is meant to run.
    pub target: Address,
    /// The embedded action calldata, exactly as the offset located it.
    pub action_data: Bytes,
    /// The offset the envelope's head word carried.
    pub action_offset: usize,
}

impl ExecuteCall {
    /// Builds canonical `execute` calldata.
    pub fn encode(target: Address, action_data: &[u8]) -> Bytes {
        AbiEncoder::new(Selector::EXECUTE)
            .address(target)
            .bytes(action_data)
            .finish()
    }

    /// Decodes `execute` calldata.
    ///
    /// # Errors
    ///
    /// Fails if the selector is not `execute`, if the target word is dirty,
    /// or if the offset/length of the action data run out of bounds.
    pub fn decode(calldata: &[u8]) -> Result<Self, AbiError> {
        let (selector, args) = split_selector(calldata)?;
        if selector != Selector::EXECUTE {
            return Err(AbiError::UnexpectedSelector {
                expected: Selector::EXECUTE,
                found: selector,
            });
        }
        let dec = AbiDecoder::new(args);
        let target = dec.address(0)?;
        let action = dec.bytes(1)?;
        Ok(Self {
            target,
            action_data: Bytes::copy_from_slice(action.data),
            action_offset: action.offset,
        })
    }

    /// `true` if the action data sits right after the head, where every
    /// honest encoder puts it.
    pub fn is_canonical(&self) -> bool {
        self.action_offset == CANONICAL_ACTION_OFFSET
    }
}

/// Reads the four bytes where a canonically encoded `execute` call keeps
/// its action selector.
///
/// This is a diagnostic, never an authorization input: a payload with a
/// doctored offset can put anything it likes here. Comparing it with the
/// selector the decoder actually found is how smuggling attempts show up
/// in the logs.
pub fn canonical_position_selector(calldata: &[u8]) -> Option<Selector> {
    let end = CANONICAL_ACTION_SELECTOR_POSITION + SELECTOR_LENGTH;
    let raw = calldata.get(CANONICAL_ACTION_SELECTOR_POSITION..end)?;
    let mut bytes = [0u8; SELECTOR_LENGTH];
    bytes.copy_from_slice(raw);
    Some(Selector::new(bytes))
}

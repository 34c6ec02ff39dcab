//! Calldata inspection.

use serde::Serialize;

use warden_contracts::action::canonical_position_selector;
use warden_contracts::{Action, ExecuteCall};
use warden_protocol::abi::{AbiError, Selector};
use warden_protocol::Address;

/// What an `execute` call would actually run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inspection {
    /// Call target.
    pub target: Address,
    /// Offset carried by the `data` head word.
    pub action_offset: usize,
    /// Whether the offset is the canonical one.
    pub canonical: bool,
    /// The action the decoder found by following the offset.
    pub action: Action,
    /// Signature of that action.
    pub signature: Option<&'static str>,
    /// Whatever sits where a canonical encoding keeps the action selector.
    pub canonical_slot: Option<Selector>,
    /// The envelope is shaped to look like a different call than it is.
    pub smuggling_suspected: bool,
}

/// Decodes `calldata` the same way the vault does.
pub fn inspect(calldata: &[u8]) -> Result<Inspection, AbiError> {
    let call = ExecuteCall::decode(calldata)?;
    let action = Action::decode(&call.action_data)?;
    let canonical_slot = canonical_position_selector(calldata);
    Ok(Inspection {
        target: call.target,
        action_offset: call.action_offset,
        canonical: call.is_canonical(),
        signature: action.selector().signature(),
        smuggling_suspected: !call.is_canonical() || canonical_slot != Some(action.selector()),
        action,
        canonical_slot,
    })
}

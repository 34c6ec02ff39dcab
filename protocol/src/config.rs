//! # Protocol Configuration & Constants
//!
//! Every magic number in Warden lives here. If you're hardcoding a selector
//! or a word size somewhere else, move it here.
//!
//! The selector values are the standard 4-byte function identifiers of the
//! vault interface, so calldata built by existing ABI tooling decodes here
//! unchanged.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// The full version string of the payload format.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Encoding Parameters
// ---------------------------------------------------------------------------

/// Width of one ABI word in bytes. Every head slot, every offset, every
/// length prefix is exactly one word.
pub const WORD_SIZE: usize = 32;

/// Width of an operation selector in bytes.
pub const SELECTOR_LENGTH: usize = 4;

/// Width of an account address in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// Hash output length in bytes.
pub const HASH_OUTPUT_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

/// `execute(address,bytes)`: the single gated entry point.
pub const EXECUTE_SELECTOR: [u8; SELECTOR_LENGTH] = [0x1c, 0xff, 0x79, 0xcd];

/// `withdraw(address,address,uint256)`: rate-limited withdrawal.
pub const WITHDRAW_SELECTOR: [u8; SELECTOR_LENGTH] = [0xd9, 0xca, 0xed, 0x12];

/// `sweepFunds(address,address)`: emergency sweep of a full balance.
pub const SWEEP_SELECTOR: [u8; SELECTOR_LENGTH] = [0x85, 0xfb, 0x70, 0x9d];

/// Offset of the `bytes` argument in a canonically encoded `execute` call,
/// measured from the start of the argument block: two head words.
pub const CANONICAL_ACTION_OFFSET: usize = 2 * WORD_SIZE;

/// Position of the first action-data byte inside canonical `execute`
/// calldata: selector, target word, offset word, length word.
pub const CANONICAL_ACTION_SELECTOR_POSITION: usize = SELECTOR_LENGTH + 3 * WORD_SIZE;

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// BLAKE3 derive-key context for action identifiers. Changing this string
/// invalidates every permission ever granted, so don't.
pub const ACTION_ID_CONTEXT: &str = "warden 2026-01-01 action-id v1";

// ---------------------------------------------------------------------------
// Withdrawal Limits
// ---------------------------------------------------------------------------

/// Default maximum amount per withdrawal: one whole token at 18 decimals.
pub const DEFAULT_WITHDRAWAL_LIMIT: u128 = 1_000_000_000_000_000_000;

/// Default minimum spacing between two withdrawals.
pub const DEFAULT_WAITING_PERIOD: Duration = Duration::from_secs(15 * 24 * 60 * 60);

/// Maximum calldata size accepted by the decoder. Real calls are a few
/// hundred bytes; anything near this limit is garbage or an attack.
pub const MAX_CALLDATA_SIZE: usize = 64 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_are_distinct() {
        assert_ne!(EXECUTE_SELECTOR, WITHDRAW_SELECTOR);
        assert_ne!(EXECUTE_SELECTOR, SWEEP_SELECTOR);
        assert_ne!(WITHDRAW_SELECTOR, SWEEP_SELECTOR);
    }

    #[test]
    fn canonical_layout_positions() {
        assert_eq!(CANONICAL_ACTION_OFFSET, 0x40);
        assert_eq!(CANONICAL_ACTION_SELECTOR_POSITION, 100);
    }

    #[test]
    fn default_limits_sanity() {
        assert!(DEFAULT_WITHDRAWAL_LIMIT > 0);
        assert_eq!(DEFAULT_WAITING_PERIOD.as_secs(), 1_296_000);
    }
}

//! # Offset-Based Word Codec
//!
//! Calldata uses the contract ABI word layout:
//!
//! ```text
//! selector (4 bytes)
//! head     one 32-byte word per argument
//!            static values inline (addresses right-aligned, uints big-endian)
//!            dynamic values as a byte offset into the argument block
//! tail     for each dynamic value: length word, data, zero padding
//! ```
//!
//! Offsets are measured from the first byte after the selector. That base is
//! fixed by [`AbiDecoder::new`] and never re-derived, so every reader of a
//! buffer agrees on what byte N means.
//!
//! ## One decoder
//!
//! This module is the only place in the workspace that turns raw bytes into
//! values. Authorization code and execution code both go through it, and in
//! practice through a single decode whose result they share.

pub mod decoder;
pub mod encoder;
pub mod selector;

use thiserror::Error;

use crate::address::AddressError;

pub use decoder::{split_selector, AbiDecoder, DynamicBytes};
pub use encoder::AbiEncoder;
pub use selector::Selector;

/// Errors raised while decoding calldata.
///
/// Every variant names the position that failed so that a rejected payload
/// can be diagnosed from the log line alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    /// Calldata shorter than a selector.
    #[error("calldata too short for a selector: {0} bytes")]
    MissingSelector(usize),

    /// Calldata larger than the protocol accepts.
    #[error("calldata too large: {size} bytes (max {max})")]
    TooLarge {
        /// Actual size.
        size: usize,
        /// Configured ceiling.
        max: usize,
    },

    /// A read ran past the end of the argument block.
    #[error("read out of bounds: {length} bytes at {position}, only {available} available")]
    OutOfBounds {
        /// Start of the read, relative to the argument block.
        position: usize,
        /// Bytes requested.
        length: usize,
        /// Size of the argument block.
        available: usize,
    },

    /// The selector is not one this decoder knows how to handle.
    #[error("unknown selector {0}")]
    UnknownSelector(Selector),

    /// The selector is valid but not the one the caller expected here.
    #[error("unexpected selector: expected {expected}, found {found}")]
    UnexpectedSelector {
        /// What the context requires.
        expected: Selector,
        /// What the calldata carries.
        found: Selector,
    },

    /// An address slot had non-zero padding.
    #[error("head word {index}: {source}")]
    InvalidAddress {
        /// Head word index.
        index: usize,
        /// Underlying address error.
        #[source]
        source: AddressError,
    },

    /// An integer slot does not fit the target type.
    #[error("head word {index}: value exceeds {bits}-bit range")]
    ValueOverflow {
        /// Head word index.
        index: usize,
        /// Width of the target integer.
        bits: u32,
    },

    /// A static-only call carried bytes beyond its last argument.
    #[error("unexpected trailing bytes: expected {expected} argument bytes, got {actual}")]
    TrailingBytes {
        /// Exact argument length for this call.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
}

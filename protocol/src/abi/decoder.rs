//! Calldata decoder.
//!
//! [`split_selector`] peels the 4-byte selector off a buffer; an
//! [`AbiDecoder`] then reads the remaining argument block. All positions are
//! relative to the start of that block and every read is bounds checked
//! with checked arithmetic, so an attacker-supplied offset can produce an
//! error but never a panic or a wrapped index.

use tracing::trace;

use crate::address::Address;
use crate::config::{MAX_CALLDATA_SIZE, SELECTOR_LENGTH, WORD_SIZE};

use super::{AbiError, Selector};

/// Splits calldata into its selector and argument block.
///
/// # Errors
///
/// Returns [`AbiError::MissingSelector`] if fewer than 4 bytes are present
/// and [`AbiError::TooLarge`] if the buffer exceeds [`MAX_CALLDATA_SIZE`].
pub fn split_selector(calldata: &[u8]) -> Result<(Selector, &[u8]), AbiError> {
    if calldata.len() > MAX_CALLDATA_SIZE {
        return Err(AbiError::TooLarge {
            size: calldata.len(),
            max: MAX_CALLDATA_SIZE,
        });
    }
    if calldata.len() < SELECTOR_LENGTH {
        return Err(AbiError::MissingSelector(calldata.len()));
    }
    let (head, args) = calldata.split_at(SELECTOR_LENGTH);
    let mut bytes = [0u8; SELECTOR_LENGTH];
    bytes.copy_from_slice(head);
    Ok((Selector::new(bytes), args))
}

/// A dynamic `bytes` value located through a head offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicBytes<'a> {
    /// Offset stored in the head word, relative to the argument block.
    pub offset: usize,
    /// The value itself, exactly `length` bytes.
    pub data: &'a [u8],
}

/// Reader over one argument block.
#[derive(Debug, Clone, Copy)]
pub struct AbiDecoder<'a> {
    args: &'a [u8],
}

impl<'a> AbiDecoder<'a> {
    /// Creates a decoder whose offset base is the first byte of `args`.
    pub fn new(args: &'a [u8]) -> Self {
        Self { args }
    }

    /// Size of the argument block in bytes.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns `true` if the argument block is empty.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Requires the block to be exactly `words` head words long.
    ///
    /// Used by calls whose arguments are all static: anything after the last
    /// word is bytes nobody will ever look at, and bytes nobody looks at are
    /// where smuggled payloads hide.
    pub fn expect_static_words(&self, words: usize) -> Result<(), AbiError> {
        let expected = words * WORD_SIZE;
        if self.args.len() != expected {
            return Err(AbiError::TrailingBytes {
                expected,
                actual: self.args.len(),
            });
        }
        Ok(())
    }

    /// Reads head word `index`.
    pub fn word(&self, index: usize) -> Result<&'a [u8; WORD_SIZE], AbiError> {
        let position = index.checked_mul(WORD_SIZE).ok_or(AbiError::OutOfBounds {
            position: usize::MAX,
            length: WORD_SIZE,
            available: self.args.len(),
        })?;
        self.word_at(position)
    }

    /// Reads head word `index` as an address.
    pub fn address(&self, index: usize) -> Result<Address, AbiError> {
        let word = self.word(index)?;
        Address::from_word(word).map_err(|source| AbiError::InvalidAddress { index, source })
    }

    /// Reads head word `index` as an unsigned integer that must fit in 128 bits.
    pub fn uint128(&self, index: usize) -> Result<u128, AbiError> {
        let word = self.word(index)?;
        word_to_u128(word).ok_or(AbiError::ValueOverflow { index, bits: 128 })
    }

    /// Follows the offset in head word `index` to a dynamic `bytes` value.
    ///
    /// The offset and the length prefix are both validated against the
    /// block size before any slicing happens. Non-canonical offsets (pointing
    /// somewhere other than right after the head) are accepted, because the
    /// value found there is the value; callers that care can compare
    /// [`DynamicBytes::offset`] against the canonical position.
    pub fn bytes(&self, index: usize) -> Result<DynamicBytes<'a>, AbiError> {
        let offset_word = self.word(index)?;
        let offset = word_to_usize(offset_word).ok_or(AbiError::ValueOverflow { index, bits: 64 })?;

        let length_word = self.word_at(offset)?;
        let length = word_to_usize(length_word).ok_or(AbiError::OutOfBounds {
            position: offset,
            length: usize::MAX,
            available: self.args.len(),
        })?;

        let start = offset + WORD_SIZE;
        let data = self.slice(start, length)?;
        trace!(index, offset, length, "dynamic bytes located");
        Ok(DynamicBytes { offset, data })
    }

    fn word_at(&self, position: usize) -> Result<&'a [u8; WORD_SIZE], AbiError> {
        let slice = self.slice(position, WORD_SIZE)?;
        slice.try_into().map_err(|_| AbiError::OutOfBounds {
            position,
            length: WORD_SIZE,
            available: self.args.len(),
        })
    }

    fn slice(&self, position: usize, length: usize) -> Result<&'a [u8], AbiError> {
        let out_of_bounds = AbiError::OutOfBounds {
            position,
            length,
            available: self.args.len(),
        };
        let end = position.checked_add(length).ok_or(out_of_bounds.clone())?;
        self.args.get(position..end).ok_or(out_of_bounds)
    }
}

/// Interprets a big-endian word as `u128`, or `None` if the high half is set.
pub fn word_to_u128(word: &[u8; WORD_SIZE]) -> Option<u128> {
    let (high, low) = word.split_at(WORD_SIZE - 16);
    if high.iter().any(|b| *b != 0) {
        return None;
    }
    let mut buf = [0u8; 16];
    buf.copy_from_slice(low);
    Some(u128::from_be_bytes(buf))
}

fn word_to_usize(word: &[u8; WORD_SIZE]) -> Option<usize> {
    let (high, low) = word.split_at(WORD_SIZE - 8);
    if high.iter().any(|b| *b != 0) {
        return None;
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(low);
    usize::try_from(u64::from_be_bytes(buf)).ok()
}

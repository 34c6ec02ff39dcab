//! Calldata encoder.
//!
//! Always produces the canonical layout: dynamic values go into the tail in
//! argument order, each head offset points at its own length word, and data
//! is zero-padded to a word boundary.

use bytes::{BufMut, Bytes, BytesMut};

use crate::address::Address;
use crate::config::{SELECTOR_LENGTH, WORD_SIZE};

use super::Selector;

#[derive(Debug, Clone)]
enum Slot {
    Static([u8; WORD_SIZE]),
    Dynamic(Vec<u8>),
}

/// Builder for one call's calldata.
///
/// ```
/// use warden_protocol::abi::{AbiEncoder, Selector};
/// use warden_protocol::Address;
///
/// let calldata = AbiEncoder::new(Selector::SWEEP)
///     .address(Address::from_low_u64_be(1))
///     .address(Address::from_low_u64_be(2))
///     .finish();
/// assert_eq!(calldata.len(), 4 + 2 * 32);
/// ```
#[derive(Debug, Clone)]
pub struct AbiEncoder {
    selector: Selector,
    slots: Vec<Slot>,
}

impl AbiEncoder {
    /// Starts a call with the given selector.
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            slots: Vec::new(),
        }
    }

    /// Appends an address argument.
    pub fn address(mut self, address: Address) -> Self {
        self.slots.push(Slot::Static(address.to_word()));
        self
    }

    /// Appends an unsigned integer argument.
    pub fn uint(mut self, value: u128) -> Self {
        self.slots.push(Slot::Static(u128_to_word(value)));
        self
    }

    /// Appends a dynamic `bytes` argument.
    pub fn bytes(mut self, data: &[u8]) -> Self {
        self.slots.push(Slot::Dynamic(data.to_vec()));
        self
    }

    /// Lays out head and tail and returns the finished calldata.
    pub fn finish(self) -> Bytes {
        let head_len = self.slots.len() * WORD_SIZE;
        let tail_len: usize = self
            .slots
            .iter()
            .map(|slot| match slot {
                Slot::Static(_) => 0,
                Slot::Dynamic(data) => WORD_SIZE + padded_len(data.len()),
            })
            .sum();

        let mut out = BytesMut::with_capacity(SELECTOR_LENGTH + head_len + tail_len);
        out.put_slice(self.selector.as_bytes());

        let mut tail = BytesMut::with_capacity(tail_len);
        for slot in &self.slots {
            match slot {
                Slot::Static(word) => out.put_slice(word),
                Slot::Dynamic(data) => {
                    out.put_slice(&usize_to_word(head_len + tail.len()));
                    tail.put_slice(&usize_to_word(data.len()));
                    tail.put_slice(data);
                    tail.put_bytes(0, padded_len(data.len()) - data.len());
                }
            }
        }
        out.put_slice(&tail);
        out.freeze()
    }
}

/// Encodes a `u128` as a big-endian word.
pub fn u128_to_word(value: u128) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - 16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Encodes a `usize` as a big-endian word.
pub fn usize_to_word(value: usize) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD_SIZE) * WORD_SIZE
}

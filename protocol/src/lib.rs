// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Warden Protocol: Core Library
//!
//! The building blocks underneath the Warden vault. Nothing in here knows
//! what a withdrawal or a sweep is; it only knows how to name accounts, how
//! to lay bytes out in 32-byte words, how to tell time and how to move
//! balances around.
//!
//! ## Architecture
//!
//! - **address**: 20-byte account identifiers with a `0x…` text form.
//! - **abi**: The offset-based word codec. One encoder, one decoder, and
//!   nobody is allowed to parse calldata any other way.
//! - **crypto**: Hashing. BLAKE3, domain separated, nothing exotic.
//! - **clock**: Where "now" comes from. Wall clock in production, a
//!   hand-cranked clock in tests.
//! - **ledger**: The value-transfer primitive the vault moves money with.
//! - **config**: Protocol constants: selectors, word sizes, default limits.
//!
//! ## Design Philosophy
//!
//! 1. Decode once. A buffer parsed twice is two opinions about one payload.
//! 2. Every failure is a typed error. No panics on attacker-controlled bytes.
//! 3. If it touches money, it has tests. Plural.

pub mod abi;
pub mod address;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod ledger;

pub use address::Address;

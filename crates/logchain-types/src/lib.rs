//! Foundation types for LogChain.
//!
//! LogChain lets edge devices prove that a batch of log lines existed in a
//! specific form at a specific time by anchoring a single fingerprint of the
//! batch into an append-only ledger. Every other LogChain crate depends on
//! `logchain-types`.
//!
//! # Key Types
//!
//! - [`Fingerprint`]: 32-byte batch commitment, rendered `0x` + 64 hex
//! - [`BatchRecord`]: durable record of one fingerprinted batch
//! - [`AnchorStatus`]: monotonic `Unanchored` → `Anchored` lifecycle
//! - [`LedgerEntry`]: the ledger's own view of an anchored fingerprint
//! - [`TxRef`] / [`BlockRef`]: ledger transaction and block references
//! - [`AccountId`]: the address of a signing identity

pub mod batch;
pub mod error;
pub mod fingerprint;
pub mod ledger;

mod hex32;

pub use batch::{AnchorStatus, BatchDraft, BatchId, BatchRecord};
pub use error::TypeError;
pub use fingerprint::Fingerprint;
pub use ledger::{AccountId, BlockRef, LedgerEntry, TxRef};

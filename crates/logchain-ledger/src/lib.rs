//! Ledger gateway for LogChain.
//!
//! This crate is the only path to the external ledger. It provides:
//! - `LedgerClient`, the raw chain boundary (nonce reads, broadcast,
//!   confirmation, entry reads)
//! - `LedgerGateway`, the narrow submit / count / entry_at surface the rest
//!   of LogChain uses
//! - `SerializedGateway`, which funnels every submission for the shared
//!   signing identity through one nonce slot
//! - `InMemoryChain`, a development ledger for tests, demos, and embedding

pub mod config;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod traits;
pub mod transaction;

pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult};
pub use gateway::{connect, SerializedGateway};
pub use memory::InMemoryChain;
pub use traits::{Confirmation, LedgerClient, LedgerGateway, Submission};
pub use transaction::{AnchorCall, SignedTransaction, SigningIdentity, UnsignedTransaction};

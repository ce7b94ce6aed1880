//! Anchoring and reconciliation for LogChain.
//!
//! - [`AnchorCoordinator`] drives a batch record from `Unanchored` to
//!   `Anchored` through the ledger gateway, short-circuiting records that are
//!   already anchored.
//! - [`ReconciliationVerifier`] re-derives ledger truth by scanning entries
//!   in index order and reports the first match for a record's fingerprint,
//!   independent of the record's own status.
//! - [`IndexedVerifier`] keeps an incremental fingerprint index so repeated
//!   verification does not rescan the ledger.

pub mod coordinator;
pub mod error;
pub mod index;
pub mod verifier;

#[cfg(test)]
mod test_support;

pub use coordinator::{AnchorCoordinator, AnchorOutcome};
pub use error::{AnchorError, AnchorResult};
pub use index::IndexedVerifier;
pub use verifier::{Discrepancy, Reconciliation, ReconciliationVerifier};

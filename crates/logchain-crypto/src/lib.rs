//! Cryptographic primitives for LogChain.
//!
//! Provides the batch fingerprint (a pairwise SHA-256 fold over log lines),
//! per-line inclusion proofs against a fingerprint, and the Ed25519 keys
//! behind the ledger signing identity.
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod fingerprint;
pub mod hasher;
pub mod signer;

pub use fingerprint::{fingerprint_lines, BatchTree, FingerprintBuilder, LineProof, Side};
pub use hasher::{leaf_digest, node_digest, Digest};
pub use signer::{Signature, SignatureError, SigningKey, VerifyingKey};

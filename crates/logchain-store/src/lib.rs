//! Batch record storage for LogChain.
//!
//! The anchoring core only needs to read a record by id and apply the
//! one-way `Anchored` transition. Everything else here (listing, filters)
//! serves the HTTP surface.
//!
//! All backends implement [`BatchStore`]:
//!
//! - [`InMemoryBatchStore`] -- `HashMap`-based store for tests and embedding

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBatchStore;
pub use traits::{BatchQuery, BatchStore};

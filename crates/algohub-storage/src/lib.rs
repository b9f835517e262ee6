//! # algohub-storage
//!
//! Blob mirror providers for AlgoHub. Each algorithm's source document is
//! duplicated here, keyed by algorithm id.

pub mod providers;

pub use providers::{LocalBlobStore, MemoryBlobStore};

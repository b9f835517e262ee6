//! Collaborator traits defined in `algohub-core` and implemented by other crates.

pub mod blob;

pub use blob::BlobStore;

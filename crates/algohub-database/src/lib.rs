//! # algohub-database
//!
//! Persistence for AlgoHub: the store traits the rights engine and
//! services depend on, their PostgreSQL implementations, and an in-memory
//! implementation used by tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{AlgorithmStore, FolderStore, RightsStore, TreeStore, UserStore};

//! Account lookups and self-service deletion.

pub mod service;

pub use service::UserService;

//! # algohub-core
//!
//! Core crate for AlgoHub. Contains the unified error system, typed
//! identifiers, configuration schemas, and the collaborator traits that
//! other crates implement.
//!
//! This crate has **no** internal dependencies on other AlgoHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind, FieldIssue};
pub use result::AppResult;

//! Operator-side rights administration.

pub mod service;

pub use service::RightsAdminService;

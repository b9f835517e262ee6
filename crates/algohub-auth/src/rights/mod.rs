//! Effective rights resolution with folder inheritance and traversal guards.

pub mod ancestry;
pub mod resolver;

pub use resolver::{ResolvedRights, RightsResolver};

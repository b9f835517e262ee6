//! # algohub-auth
//!
//! Authorization for AlgoHub: effective access levels computed from direct
//! grants and grants inherited through the folder hierarchy.
//!
//! Authentication (tokens, sessions, passwords) happens upstream; every
//! entry point here receives an already-authenticated user id.

pub mod rights;

pub use rights::{ResolvedRights, RightsResolver};

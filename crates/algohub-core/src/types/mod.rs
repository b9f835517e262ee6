//! Core type definitions used across the AlgoHub workspace.

pub mod id;

pub use id::*;

//! # algohub-entity
//!
//! Domain entity models for AlgoHub. Every struct in this crate represents
//! a database row or a domain value object. Row types additionally derive
//! `sqlx::FromRow`.

pub mod algorithm;
pub mod folder;
pub mod rights;
pub mod user;

//! Integration tests for AlgoHub, run against the in-memory stores.

mod helpers;

mod algorithm_test;
mod folder_test;
mod permission_test;
mod user_test;

//! Library surface of til-api.
//!
//! The binary in `main.rs` wires these services into the router; exposing
//! them here keeps them reachable from integration tests.

pub mod pages;
pub mod services;

//! # til-core
//!
//! Core types, traits, and abstractions for the TIL acronym service.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the database and API crates depend on.

pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;

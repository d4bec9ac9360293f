//! # Error Handling
//!
//! Error types for the Formplane engine, defined with `thiserror`.

pub mod types;

pub use types::{FormplaneError, Result};

//! # Storage and Persistence
//!
//! Working copies of configuration documents live on disk. The engine only
//! ever talks to the [`ConfigStore`] trait; [`JsonFileStore`] is the
//! implementation the binary uses.

pub mod file_store;

use std::path::Path;

use crate::errors::Result;

pub use file_store::{checksum, JsonFileStore};

/// Persistence boundary for typed configuration documents.
pub trait ConfigStore<C> {
    /// Read the document stored at `path`.
    fn load(&self, path: &Path) -> Result<C>;

    /// Replace the document at `path`, returning the checksum of what was written.
    fn write(&self, config: &C, path: &Path) -> Result<String>;
}

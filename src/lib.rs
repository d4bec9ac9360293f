//! # Formplane
//!
//! Formplane edits typed configuration documents (an API gateway config and a
//! log-sink config) through a uniform tree of form nodes. Each document is
//! split into fixed areas; every area renders into input nodes carrying their
//! validation findings, and edited nodes are read back into the document.
//!
//! ## Architecture
//!
//! ```text
//! working copy → validator → sync engine → areas → tree edits
//!      ↑                                              ↓
//!   storage  ←  update (normalize)  ←  sync engine (reverse)
//! ```
//!
//! ## Core Components
//!
//! - **Form tree** (`form`): closed set of field values, nodes and areas
//! - **Sync engines** (`sync`): per-document mapping in both directions
//! - **Tree edits** (`edit`): append, insert, duplicate and delete by key
//! - **Sessions** (`session`): one validated, persisted edit per call
//! - **Collaborators** (`storage`, `validation`): swappable store and validator
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use formplane::{
//!     domain::GatewayConfig, form::TooltipTable, session::EditCommand, storage::JsonFileStore,
//!     validation::GatewayValidator, EditSession, Result,
//! };
//!
//! fn main() -> Result<()> {
//!     let mut session = EditSession::<GatewayConfig, _, _>::open(
//!         JsonFileStore::new(),
//!         GatewayValidator,
//!         "data/gateway.json",
//!         TooltipTable::default(),
//!     )?;
//!     let outcome = session.apply(&EditCommand::Append { area: "routers".into() })?;
//!     println!("wrote {}", outcome.checksum);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod edit;
pub mod errors;
pub mod form;
pub mod observability;
pub mod session;
pub mod storage;
pub mod sync;
pub mod validation;

// Re-export commonly used types and traits
pub use config::EditorSettings;
pub use errors::{FormplaneError, Result};
pub use observability::Diagnostics;
pub use session::{EditCommand, EditOutcome, EditSession};
pub use sync::{SyncEngine, ValidationReport};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

//! # Configuration Management
//!
//! Settings of the editor process, loaded from defaults, an optional TOML file
//! and `FORMPLANE__*` environment variables.

pub mod settings;

pub use settings::{EditorSettings, LoggingSettings, WorkspaceSettings, ENV_PREFIX};

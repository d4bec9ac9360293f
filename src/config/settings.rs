//! # Configuration Settings
//!
//! Defines the settings structure of the Formplane editor itself (not the
//! gateway or log-sink documents it edits).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{FormplaneError, Result};
use crate::form::TooltipTable;

/// Prefix of environment overrides, e.g. `FORMPLANE__LOGGING__LEVEL=debug`.
pub const ENV_PREFIX: &str = "FORMPLANE";

/// Main editor settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct EditorSettings {
    /// Logging configuration
    #[validate(nested)]
    pub logging: LoggingSettings,

    /// Working copy locations
    #[validate(nested)]
    pub workspace: WorkspaceSettings,

    /// Overrides for the validation tooltip table
    pub tooltips: TooltipTable,
}

impl EditorSettings {
    /// Load defaults, then an optional settings file, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&EditorSettings::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings: EditorSettings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(FormplaneError::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        if self.workspace.gateway_file == self.workspace.log_sink_file {
            return Err(FormplaneError::config(
                "Gateway and log-sink working copies cannot share a file",
            ));
        }
        Ok(())
    }

    /// Built-in tooltips with the configured overrides applied.
    pub fn tooltip_table(&self) -> TooltipTable {
        TooltipTable::default().merged_with(&self.tooltips)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub level: String,

    /// Enable JSON structured logging
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

/// Where working copies live on disk
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct WorkspaceSettings {
    #[validate(length(min = 1, message = "Workspace directory cannot be empty"))]
    pub directory: String,

    #[validate(length(min = 1, message = "Gateway file name cannot be empty"))]
    pub gateway_file: String,

    #[validate(length(min = 1, message = "Log-sink file name cannot be empty"))]
    pub log_sink_file: String,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            directory: "./data".to_string(),
            gateway_file: "gateway.json".to_string(),
            log_sink_file: "log_sink.json".to_string(),
        }
    }
}

impl WorkspaceSettings {
    pub fn gateway_path(&self) -> PathBuf {
        Path::new(&self.directory).join(&self.gateway_file)
    }

    pub fn log_sink_path(&self) -> PathBuf {
        Path::new(&self.directory).join(&self.log_sink_file)
    }
}

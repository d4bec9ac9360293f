//! # Command Line Interface
//!
//! Renders, validates, normalizes and edits gateway and log-sink working
//! copies from the shell. Every edit goes through an [`EditSession`], so the
//! CLI persists exactly what a form submission would.

pub mod output;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::EditorSettings;
use crate::domain::{GatewayConfig, LogSinkConfig};
use crate::form::TooltipTable;
use crate::observability::{init_logging, Diagnostics};
use crate::session::{EditCommand, EditOutcome, EditSession, FieldSubmission};
use crate::storage::{ConfigStore, JsonFileStore};
use crate::sync::SyncEngine;
use crate::validation::{ConfigValidator, GatewayValidator, LogSinkValidator};

use output::{print_areas, print_outcome, print_report, AreasOutput, OutputFormat};

#[derive(Parser)]
#[command(name = "formplane")]
#[command(about = "Form-driven editing of gateway and log-sink configurations")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Editor settings file (TOML)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Working copy to operate on instead of the workspace default
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Output format: json, yaml, toml or table
    #[arg(short, long, global = true, default_value = "json")]
    pub output: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Which configuration document a command addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocumentKind {
    Gateway,
    LogSink,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default working copy
    Init {
        kind: DocumentKind,

        /// Overwrite an existing working copy
        #[arg(long)]
        force: bool,
    },

    /// Print the editable areas with findings overlaid
    Render { kind: DocumentKind },

    /// Print the validation report
    Validate { kind: DocumentKind },

    /// Sort a working copy and rewrite it
    Normalize { kind: DocumentKind },

    /// Apply one tree edit and persist the result
    Edit {
        kind: DocumentKind,

        #[command(subcommand)]
        op: EditOp,
    },
}

impl Commands {
    fn kind(&self) -> DocumentKind {
        match self {
            Commands::Init { kind, .. }
            | Commands::Render { kind }
            | Commands::Validate { kind }
            | Commands::Normalize { kind }
            | Commands::Edit { kind, .. } => *kind,
        }
    }
}

#[derive(Subcommand)]
pub enum EditOp {
    /// Replace the values of a node, or of one slot of a router/processor
    Set {
        #[arg(long)]
        area: String,
        #[arg(long)]
        key: String,
        #[arg(long)]
        slot: Option<usize>,
        /// Submitted values; header maps take name/value pairs
        values: Vec<String>,
    },

    /// Add a router, or a new last processor stage
    Append {
        #[arg(long)]
        area: String,
    },

    /// Add a router or processor alternative next to `key`
    Insert {
        #[arg(long)]
        area: String,
        #[arg(long)]
        key: String,
        #[arg(long)]
        before: bool,
    },

    /// Open a processor stage next to the stage holding `key`
    InsertStage {
        #[arg(long)]
        area: String,
        #[arg(long)]
        key: String,
        #[arg(long)]
        before: bool,
    },

    /// Copy a router or processor in front of itself
    Duplicate {
        #[arg(long)]
        area: String,
        #[arg(long)]
        key: String,
    },

    /// Remove a router or processor alternative
    Delete {
        #[arg(long)]
        area: String,
        #[arg(long)]
        key: String,
    },

    /// Apply a JSON-encoded command read from a file
    Apply {
        #[arg(long)]
        command_file: PathBuf,
    },
}

impl EditOp {
    fn into_command(self) -> anyhow::Result<EditCommand> {
        let command = match self {
            EditOp::Set { area, key, slot, values } => EditCommand::SetValues {
                submissions: vec![FieldSubmission { area, key, slot, values }],
            },
            EditOp::Append { area } => EditCommand::Append { area },
            EditOp::Insert { area, key, before } => EditCommand::Insert { area, key, before },
            EditOp::InsertStage { area, key, before } => {
                EditCommand::InsertStage { area, key, before }
            }
            EditOp::Duplicate { area, key } => EditCommand::Duplicate { area, key },
            EditOp::Delete { area, key } => EditCommand::Delete { area, key },
            EditOp::Apply { command_file } => {
                let contents = std::fs::read_to_string(&command_file)
                    .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", command_file.display(), e))?;
                serde_json::from_str(&contents).map_err(|e| {
                    anyhow::anyhow!("Invalid command in {}: {}", command_file.display(), e)
                })?
            }
        };
        Ok(command)
    }
}

/// Run CLI commands
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = EditorSettings::load(cli.settings.as_deref())?;
    if cli.verbose {
        settings.logging.level = "debug".to_string();
    }
    init_logging(&settings.logging)?;

    let format = OutputFormat::parse(&cli.output)?;
    let tooltips = settings.tooltip_table();
    let kind = cli.command.kind();
    let path = cli.file.clone().unwrap_or_else(|| match kind {
        DocumentKind::Gateway => settings.workspace.gateway_path(),
        DocumentKind::LogSink => settings.workspace.log_sink_path(),
    });

    match kind {
        DocumentKind::Gateway => run_document::<GatewayConfig, _>(
            cli.command,
            &path,
            GatewayValidator,
            tooltips,
            format,
        ),
        DocumentKind::LogSink => run_document::<LogSinkConfig, _>(
            cli.command,
            &path,
            LogSinkValidator,
            tooltips,
            format,
        ),
    }
}

fn run_document<C, V>(
    command: Commands,
    path: &Path,
    validator: V,
    tooltips: TooltipTable,
    format: OutputFormat,
) -> anyhow::Result<()>
where
    C: SyncEngine + Default + Serialize + DeserializeOwned,
    V: ConfigValidator<C>,
{
    let store = JsonFileStore::new();

    match command {
        Commands::Init { force, .. } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists; pass --force to overwrite it",
                    path.display()
                );
            }
            let checksum = store.write(&C::default(), path)?;
            print_outcome(&EditOutcome { changed_keys: Default::default(), checksum }, format)
        }
        Commands::Render { .. } => {
            let session = EditSession::<C, _, _>::open(store, validator, path, tooltips)?;
            let areas = session.render()?;
            print_areas(&AreasOutput { config: C::CONFIG_NAME, areas: &areas }, format)
        }
        Commands::Validate { .. } => {
            let config: C = store.load(path)?;
            print_report(&validator.validate(&config), format)
        }
        Commands::Normalize { .. } => {
            let mut config: C = store.load(path)?;
            let diagnostics = Diagnostics::new(C::CONFIG_NAME);
            let changed_keys = config.update(&diagnostics)?;
            let checksum = store.write(&config, path)?;
            print_outcome(&EditOutcome { changed_keys, checksum }, format)
        }
        Commands::Edit { op, .. } => {
            let command = op.into_command()?;
            let mut session = EditSession::<C, _, _>::open(store, validator, path, tooltips)?;
            let outcome = session.apply(&command)?;
            print_outcome(&outcome, format)
        }
    }
}

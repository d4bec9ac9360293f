//! # Structured Logging
//!
//! Span macros and subscriber setup using the tracing ecosystem.
//!
//! Engine code never reaches for a global logger: every sync and edit call
//! receives a [`Diagnostics`](super::Diagnostics) handle and opens its spans
//! under the handle's session span with the macros below.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;
use crate::errors::{FormplaneError, Result};

/// Create the root span of one edit session.
#[macro_export]
macro_rules! session_span {
    ($config:expr, $session_id:expr) => {
        tracing::info_span!(
            "edit_session",
            config = %$config,
            session_id = %$session_id
        )
    };
}

/// Create a span for a sync engine operation under `parent`.
#[macro_export]
macro_rules! sync_span {
    ($parent:expr, $operation:expr) => {
        tracing::debug_span!(
            parent: $parent,
            "sync_operation",
            operation = %$operation
        )
    };
    ($parent:expr, $operation:expr, $($field:tt)*) => {
        tracing::debug_span!(
            parent: $parent,
            "sync_operation",
            operation = %$operation,
            $($field)*
        )
    };
}

/// Create a span for a tree edit addressed by node key.
#[macro_export]
macro_rules! edit_span {
    ($parent:expr, $operation:expr, $key:expr) => {
        tracing::debug_span!(
            parent: $parent,
            "tree_edit",
            operation = %$operation,
            key = %$key
        )
    };
}

/// Install the global subscriber for the binary.
///
/// `RUST_LOG` wins over the configured level. Installing twice is not an
/// error (integration tests set their own subscriber).
pub fn init_logging(settings: &LoggingSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| {
            FormplaneError::config_with_source(
                format!("Invalid log level '{}'", settings.level),
                Box::new(e),
            )
        })?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let installed = if settings.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if installed.is_err() {
        // Subscriber already set elsewhere (e.g. integration tests); ignore.
    }
    Ok(())
}

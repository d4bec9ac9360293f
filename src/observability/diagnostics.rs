//! Diagnostics handle passed through the engine

use tracing::Span;
use uuid::Uuid;

use crate::errors::FormplaneError;

/// Explicit logging context for one edit session.
///
/// Cloning is cheap; clones share the same session span.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    session_id: Uuid,
    span: Span,
}

impl Diagnostics {
    pub fn new(config_name: &str) -> Self {
        let session_id = Uuid::new_v4();
        let span = crate::session_span!(config_name, session_id);
        Self { session_id, span }
    }

    /// Handle that records nothing, for callers without a session.
    pub fn detached() -> Self {
        Self { session_id: Uuid::nil(), span: Span::none() }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Span for one sync engine operation.
    pub fn sync(&self, operation: &str) -> Span {
        crate::sync_span!(&self.span, operation)
    }

    /// Span for one tree edit.
    pub fn edit(&self, operation: &str, key: &str) -> Span {
        crate::edit_span!(&self.span, operation, key)
    }

    /// Report a fatal contract violation before it propagates.
    pub fn structural(&self, operation: &str, error: &FormplaneError) {
        tracing::error!(
            parent: &self.span,
            operation,
            error = %error,
            "form tree does not match the expected schema"
        );
    }
}

//! # Error Types
//!
//! Error types for the Formplane editing engine using `thiserror`.
//!
//! Two classes never mix: structural errors mean the tree and the sync engine
//! disagree about a schema and abort the whole call, while validation findings
//! are data rendered on nodes and never surface here.

/// Custom result type for Formplane operations
pub type Result<T> = std::result::Result<T, FormplaneError>;

/// Main error type for the Formplane engine
#[derive(thiserror::Error, Debug)]
pub enum FormplaneError {
    /// Tree shape does not match the schema the sync engine expects
    #[error("Structural error in {context}: {message}")]
    Structural { context: String, message: String },

    /// A node addressed by key does not exist in the list searched
    #[error("Node not found: '{key}' in {scope}")]
    NotFound { scope: String, key: String },

    /// A submitted value list could not be applied to a field
    #[error("Invalid submission: {message}")]
    Submission { message: String, field: Option<String> },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },
}

impl FormplaneError {
    /// Create a structural error
    pub fn structural<C: Into<String>, M: Into<String>>(context: C, message: M) -> Self {
        Self::Structural { context: context.into(), message: message.into() }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>, K: Into<String>>(scope: S, key: K) -> Self {
        Self::NotFound { scope: scope.into(), key: key.into() }
    }

    /// Create a submission error
    pub fn submission<S: Into<String>>(message: S) -> Self {
        Self::Submission { message: message.into(), field: None }
    }

    /// Create a submission error with field information
    pub fn submission_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Submission { message: message.into(), field: Some(field.into()) }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create an I/O error with context
    pub fn io<S: Into<String>>(source: std::io::Error, context: S) -> Self {
        Self::Io { source, context: context.into() }
    }

    /// Create a serialization error with context
    pub fn serialization<S: Into<String>>(source: serde_json::Error, context: S) -> Self {
        Self::Serialization { source, context: context.into() }
    }

    /// Whether this error signals a schema mismatch rather than bad input.
    ///
    /// A missing key is structural too: keys come from the tree the engine
    /// rendered, never from free-form operator input.
    pub fn is_structural(&self) -> bool {
        matches!(self, FormplaneError::Structural { .. } | FormplaneError::NotFound { .. })
    }

    /// Get the HTTP status code a request layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            FormplaneError::Structural { .. } => 500,
            FormplaneError::NotFound { .. } => 404,
            FormplaneError::Submission { .. } => 400,
            FormplaneError::Config { .. } => 500,
            FormplaneError::Io { .. } => 500,
            FormplaneError::Serialization { .. } => 400,
        }
    }

    /// Add context to an error
    pub(crate) fn add_context(mut self, context: &str) -> Self {
        match &mut self {
            FormplaneError::Io { context: ctx, .. }
            | FormplaneError::Serialization { context: ctx, .. }
            | FormplaneError::Structural { context: ctx, .. } => {
                *ctx = format!("{}: {}", context, ctx);
            }
            _ => {}
        }
        self
    }
}

impl From<std::io::Error> for FormplaneError {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<serde_json::Error> for FormplaneError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization { source: error, context: "JSON serialization failed".to_string() }
    }
}

impl From<config::ConfigError> for FormplaneError {
    fn from(error: config::ConfigError) -> Self {
        Self::config_with_source("Configuration loading failed", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for FormplaneError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::config(format!("Settings validation failed: {}", message))
    }
}

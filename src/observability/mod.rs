//! # Observability Infrastructure
//!
//! Structured logging for the Formplane engine: subscriber setup, span macros
//! and the [`Diagnostics`] handle threaded through sync and edit calls.

pub mod diagnostics;
pub mod logging;

pub use diagnostics::Diagnostics;
pub use logging::init_logging;

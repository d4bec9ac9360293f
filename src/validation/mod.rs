//! # Validation Module
//!
//! Producers of [`ValidationReport`]s. The sync engine never validates
//! anything itself; it only projects what a [`ConfigValidator`] found.
//!
//! The built-in validators run in three layers:
//! 1. Derive rules from the `validator` crate on the domain structs
//! 2. Option and syntax checks (choices, header names, router paths)
//! 3. Cross-element rules such as router path uniqueness

pub mod gateway;
pub mod log_sink;
pub mod rules;

use crate::sync::ValidationReport;

pub use gateway::GatewayValidator;
pub use log_sink::LogSinkValidator;

/// Turns a typed document into path-keyed findings.
pub trait ConfigValidator<C> {
    fn validate(&self, config: &C) -> ValidationReport;
}

impl<C, F> ConfigValidator<C> for F
where
    F: Fn(&C) -> ValidationReport,
{
    fn validate(&self, config: &C) -> ValidationReport {
        self(config)
    }
}

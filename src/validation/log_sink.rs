//! Built-in log-sink validator

use crate::domain::log_sink::{AUTH_MODES, FORMATS};
use crate::domain::LogSinkConfig;
use crate::sync::{ReportPath, SyncEngine, ValidationReport};

use super::rules::{check, check_headers, check_items, check_option, require};
use super::ConfigValidator;

const LEVELS: [&str; 5] = ["debug", "error", "info", "trace", "warn"];

#[derive(Debug, Clone, Copy, Default)]
pub struct LogSinkValidator;

impl ConfigValidator<LogSinkConfig> for LogSinkValidator {
    fn validate(&self, config: &LogSinkConfig) -> ValidationReport {
        let root = ReportPath::root(LogSinkConfig::CONFIG_NAME);
        let mut report = ValidationReport::new();

        check(config, &root, &mut report);
        check_option(&config.format, &FORMATS, &root.field("Format"), &mut report);

        check(&config.source, &root.field("Source"), &mut report);

        let filter = root.field("Filter");
        check(&config.filter, &filter, &mut report);
        check_items(&config.filter.levels, &LEVELS, &filter.field("Levels"), &mut report);

        let destination = root.field("Destination");
        if config.enabled {
            check(&config.destination, &destination, &mut report);
        }
        check_headers(&config.destination.headers, &destination.field("Headers"), &mut report);

        check(&config.batching, &root.field("Batching"), &mut report);

        let auth = root.field("Auth");
        check_option(&config.auth.mode, &AUTH_MODES, &auth.field("Mode"), &mut report);
        match config.auth.mode.as_str() {
            "basic" => {
                require(&config.auth.username, &auth.field("Username"), &mut report);
                require(&config.auth.secret_ref, &auth.field("SecretRef"), &mut report);
            }
            "bearer" => require(&config.auth.secret_ref, &auth.field("SecretRef"), &mut report),
            _ => {}
        }

        check(&config.retention, &root.field("Retention"), &mut report);

        tracing::debug!(findings = report.len(), "validated log-sink config");
        report
    }
}

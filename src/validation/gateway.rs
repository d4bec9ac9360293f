//! Built-in gateway validator

use std::collections::BTreeMap;

use crate::domain::gateway::{LOG_LEVELS, TLS_VERSIONS};
use crate::domain::{GatewayConfig, Processor};
use crate::sync::{ReportPath, SyncEngine, ValidationReport, NOT_UNIQUE};

use super::rules::{
    check, check_headers, check_items, check_option, is_routable_path, require, BAD_PATH,
};
use super::ConfigValidator;

const HTTP_METHODS: [&str; 9] =
    ["CONNECT", "DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT", "TRACE"];

#[derive(Debug, Clone, Copy, Default)]
pub struct GatewayValidator;

impl ConfigValidator<GatewayConfig> for GatewayValidator {
    fn validate(&self, config: &GatewayConfig) -> ValidationReport {
        let root = ReportPath::root(GatewayConfig::CONFIG_NAME);
        let mut report = ValidationReport::new();

        check(config, &root, &mut report);
        check_option(&config.log_level, &LOG_LEVELS, &root.field("LogLevel"), &mut report);

        let tls = root.field("Tls");
        check_option(&config.tls.min_version, &TLS_VERSIONS, &tls.field("MinVersion"), &mut report);
        if config.tls.enabled {
            require(&config.tls.cert_file, &tls.field("CertFile"), &mut report);
            require(&config.tls.key_file, &tls.field("KeyFile"), &mut report);
        }

        let cors = root.field("Cors");
        check_items(
            &config.cors.allowed_methods,
            &HTTP_METHODS,
            &cors.field("AllowedMethods"),
            &mut report,
        );

        let headers = root.field("Headers");
        check_headers(&config.headers.request, &headers.field("Request"), &mut report);
        check_headers(&config.headers.response, &headers.field("Response"), &mut report);

        check_routers(config, &root.field("Routers"), &mut report);
        check_matrix(&config.request_processors, &root.field("RequestProcessors"), &mut report);
        check_matrix(&config.response_processors, &root.field("ResponseProcessors"), &mut report);

        tracing::debug!(findings = report.len(), "validated gateway config");
        report
    }
}

fn check_routers(config: &GatewayConfig, section: &ReportPath, report: &mut ValidationReport) {
    let mut by_path: BTreeMap<&str, Vec<usize>> = BTreeMap::new();

    for (index, router) in config.routers.iter().enumerate() {
        let at = section.index(index);
        check(router, &at, report);
        if !router.path.is_empty() && !is_routable_path(&router.path) {
            report.insert(at.field("Path").as_str(), BAD_PATH);
        }
        check_headers(&router.ingress_headers, &at.field("IngressHeaders"), report);

        let outbound = at.field("Outbound");
        check(&router.outbound, &outbound, report);
        check_headers(&router.outbound.headers, &outbound.field("Headers"), report);

        if !router.path.is_empty() {
            by_path.entry(router.path.as_str()).or_default().push(index);
        }
    }

    let mut collided = false;
    for indices in by_path.values().filter(|indices| indices.len() > 1) {
        collided = true;
        for index in indices {
            report.insert(section.index(*index).as_str(), NOT_UNIQUE);
        }
    }
    if collided {
        report.insert(section.as_str(), NOT_UNIQUE);
    }
}

fn check_matrix(matrix: &[Vec<Processor>], section: &ReportPath, report: &mut ValidationReport) {
    for (stage, alternatives) in matrix.iter().enumerate() {
        let mut by_name: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (alternative, processor) in alternatives.iter().enumerate() {
            check(processor, &section.index(stage).index(alternative), report);
            if !processor.name.is_empty() {
                by_name.entry(processor.name.as_str()).or_default().push(alternative);
            }
        }
        for indices in by_name.values().filter(|indices| indices.len() > 1) {
            for alternative in indices {
                report.insert(section.index(stage).index(*alternative).as_str(), NOT_UNIQUE);
            }
        }
    }
}

//! Validation reports and the path grammar they are keyed by
//!
//! Paths look like `GatewayConfig.Routers[2].Outbound.Headers[x-tenant]`:
//! dotted field access, `[index]` for ordered elements and `[key]` for
//! map-like elements.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::form::VALID;

/// Token a validator attaches to repeatable elements that collide.
pub const NOT_UNIQUE: &str = "not_unique";

/// Path-keyed error tokens produced by an external validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationReport(BTreeMap<String, String>);

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, token: impl Into<String>) {
        self.0.insert(path.into(), token.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    /// Token at `path`, or `valid` when the validator said nothing.
    pub fn token(&self, path: &ReportPath) -> &str {
        self.get(path.as_str()).unwrap_or(VALID)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(path, token)| (path.as_str(), token.as_str()))
    }

    /// Any finding at `path` or below it.
    pub fn any_within(&self, path: &ReportPath) -> bool {
        self.0.keys().any(|key| path.contains(key))
    }

    /// Any finding whose key starts with the raw text `prefix`.
    pub fn any_starting_with(&self, prefix: &str) -> bool {
        self.0.keys().any(|key| key.starts_with(prefix))
    }

    /// Any finding that lies outside every one of `paths`.
    pub fn any_outside(&self, paths: &[ReportPath]) -> bool {
        self.0.keys().any(|key| !paths.iter().any(|path| path.contains(key)))
    }
}

impl FromIterator<(String, String)> for ValidationReport {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Builder for report keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportPath(String);

impl ReportPath {
    pub fn root(config_name: &str) -> Self {
        Self(config_name.to_string())
    }

    pub fn field(&self, name: &str) -> Self {
        Self(format!("{}.{}", self.0, name))
    }

    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    pub fn key(&self, key: &str) -> Self {
        Self(format!("{}[{}]", self.0, key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `key` is this path or addresses something beneath it.
    pub fn contains(&self, key: &str) -> bool {
        match key.strip_prefix(self.0.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with('['),
            None => false,
        }
    }
}

impl fmt::Display for ReportPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(entries: &[(&str, &str)]) -> ValidationReport {
        entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn path_builder_follows_grammar() {
        let path = ReportPath::root("GatewayConfig")
            .field("Routers")
            .index(2)
            .field("Outbound")
            .field("Headers")
            .key("x-tenant");
        assert_eq!(path.as_str(), "GatewayConfig.Routers[2].Outbound.Headers[x-tenant]");
    }

    #[test]
    fn contains_respects_segment_boundaries() {
        let tls = ReportPath::root("GatewayConfig").field("Tls");
        assert!(tls.contains("GatewayConfig.Tls"));
        assert!(tls.contains("GatewayConfig.Tls.CertFile"));
        assert!(!tls.contains("GatewayConfig.TlsExtra"));

        let routers = ReportPath::root("GatewayConfig").field("Routers");
        assert!(routers.contains("GatewayConfig.Routers[0].Path"));
    }

    #[test]
    fn empty_report_yields_valid_everywhere() {
        let empty = ValidationReport::new();
        let path = ReportPath::root("GatewayConfig").field("Name");
        assert_eq!(empty.token(&path), VALID);
        assert!(!empty.any_within(&path));
        assert!(!empty.any_outside(&[path]));
    }

    #[test]
    fn any_outside_ignores_listed_sections() {
        let root = ReportPath::root("GatewayConfig");
        let sections = [root.field("Tls"), root.field("Routers")];

        let inside = report(&[("GatewayConfig.Tls.CertFile", "required")]);
        assert!(!inside.any_outside(&sections));

        let outside = report(&[("GatewayConfig.Name", "required")]);
        assert!(outside.any_outside(&sections));
    }

    #[test]
    fn report_deserializes_from_flat_json_object() {
        let report: ValidationReport =
            serde_json::from_str(r#"{"GatewayConfig.Name":"required"}"#).unwrap();
        assert_eq!(report.get("GatewayConfig.Name"), Some("required"));
        assert_eq!(report.len(), 1);
    }
}

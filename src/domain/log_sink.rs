//! Log-sink configuration
//!
//! Where the gateway ships its logs: source, filtering, destination, batching,
//! credentials and retention.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::headers::{normalize_headers, Headers};

pub const FORMATS: [&str; 3] = ["json", "logfmt", "text"];
pub const AUTH_MODES: [&str; 3] = ["none", "basic", "bearer"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LogSinkConfig {
    #[validate(length(min = 1, code = "required"))]
    pub name: String,
    pub enabled: bool,
    pub format: String,
    pub source: SourceSettings,
    pub filter: FilterSettings,
    pub destination: DestinationSettings,
    pub batching: BatchSettings,
    pub auth: AuthSettings,
    pub retention: RetentionSettings,
}

impl Default for LogSinkConfig {
    fn default() -> Self {
        Self {
            name: "sink".to_string(),
            enabled: true,
            format: "json".to_string(),
            source: SourceSettings::default(),
            filter: FilterSettings::default(),
            destination: DestinationSettings::default(),
            batching: BatchSettings::default(),
            auth: AuthSettings::default(),
            retention: RetentionSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SourceSettings {
    #[validate(length(min = 1, code = "required"))]
    pub listen_address: String,
    pub topics: Vec<String>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self { listen_address: "0.0.0.0:5140".to_string(), topics: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FilterSettings {
    pub levels: Vec<String>,
    pub drop_fields: Vec<String>,
    /// Percentage of events kept
    #[validate(range(min = 0, max = 100, code = "out_of_range"))]
    pub sample_rate: i64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self { levels: Vec::new(), drop_fields: Vec::new(), sample_rate: 100 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DestinationSettings {
    #[validate(url(code = "malformed_url"))]
    pub url: String,
    pub index: String,
    pub headers: Headers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct BatchSettings {
    #[validate(range(min = 1, max = 100000, code = "out_of_range"))]
    pub max_events: i64,
    #[validate(range(min = 0, max = 3600000, code = "out_of_range"))]
    pub flush_interval_ms: i64,
    #[validate(range(min = 0, max = 100, code = "out_of_range"))]
    pub max_retries: i64,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self { max_events: 500, flush_interval_ms: 1000, max_retries: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub mode: String,
    pub username: String,
    /// Reference into a secret store, never the secret itself
    pub secret_ref: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self { mode: "none".to_string(), username: String::new(), secret_ref: String::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RetentionSettings {
    #[validate(range(min = 1, max = 3650, code = "out_of_range"))]
    pub days: i64,
    pub compress: bool,
    pub archive_path: String,
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self { days: 30, compress: true, archive_path: String::new() }
    }
}

impl LogSinkConfig {
    pub fn normalize_collections(&mut self) {
        self.source.topics.sort();
        self.filter.levels.sort();
        self.filter.drop_fields.sort();
        normalize_headers(&mut self.destination.headers);
    }
}

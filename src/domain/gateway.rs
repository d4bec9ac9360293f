//! Gateway configuration
//!
//! The typed document an operator edits: listener basics, TLS, CORS, global
//! headers, routers and the request/response processor pipelines.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::headers::{normalize_headers, Headers};

pub const LOG_LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];
pub const TLS_VERSIONS: [&str; 2] = ["1.2", "1.3"];

/// Root of a gateway configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GatewayConfig {
    #[validate(length(min = 1, code = "required"))]
    pub name: String,

    /// Schema version, shown but never edited
    pub version: String,

    #[validate(range(min = 1, max = 65535, code = "out_of_range"))]
    pub listen_port: i64,

    pub log_level: String,

    #[validate(range(min = 0, max = 600000, code = "out_of_range"))]
    pub timeout_ms: i64,

    pub tls: TlsSettings,
    pub cors: CorsSettings,
    pub headers: GlobalHeaders,
    pub routers: Vec<Router>,

    /// Stages run in order; alternatives within a stage are candidates.
    pub request_processors: Vec<Vec<Processor>>,
    pub response_processors: Vec<Vec<Processor>>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            name: "gateway".to_string(),
            version: "1".to_string(),
            listen_port: 8080,
            log_level: "info".to_string(),
            timeout_ms: 30000,
            tls: TlsSettings::default(),
            cors: CorsSettings::default(),
            headers: GlobalHeaders::default(),
            routers: Vec::new(),
            request_processors: Vec::new(),
            response_processors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsSettings {
    pub enabled: bool,
    pub cert_file: String,
    pub key_file: String,
    pub min_version: String,
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            cert_file: String::new(),
            key_file: String::new(),
            min_version: "1.2".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsSettings {
    fn normalize(&mut self) {
        self.allowed_origins.sort();
        self.allowed_methods.sort();
        self.allowed_headers.sort();
    }
}

/// Headers added to every proxied request and response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalHeaders {
    pub request: Headers,
    pub response: Headers,
}

/// Maps an ingress path onto an outbound backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Router {
    #[validate(length(min = 1, code = "required"))]
    pub path: String,
    pub ingress_headers: Headers,
    pub outbound: Outbound,
}

impl Router {
    /// Ordering used for normalization: outbound URL first, then path.
    pub fn sort_key(&self) -> (&str, &str) {
        (self.outbound.url.as_str(), self.path.as_str())
    }

    fn normalize(&mut self) {
        normalize_headers(&mut self.ingress_headers);
        normalize_headers(&mut self.outbound.headers);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Outbound {
    #[validate(url(code = "malformed_url"))]
    pub url: String,
    pub endpoint: String,
    pub headers: Headers,
}

/// One processing step alternative
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Processor {
    #[validate(length(min = 1, code = "required"))]
    pub name: String,
    pub modifier: bool,
    pub required: bool,
    #[serde(rename = "async")]
    pub is_async: bool,
    pub input: ProcessorInput,
    pub output: ProcessorOutput,
    pub topic: String,
    #[validate(range(min = 0, max = 600000, code = "out_of_range"))]
    pub timeout_ms: i64,
}

impl Processor {
    pub fn normalize(&mut self) {
        self.input.include.sort();
        self.input.exclude.sort();
        self.output.write.sort();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorInput {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorOutput {
    pub write: Vec<String>,
}

impl GatewayConfig {
    /// Sort every order-insensitive collection outside the router list.
    pub fn normalize_collections(&mut self) {
        self.cors.normalize();
        normalize_headers(&mut self.headers.request);
        normalize_headers(&mut self.headers.response);
        for router in &mut self.routers {
            router.normalize();
        }
        for matrix in [&mut self.request_processors, &mut self.response_processors] {
            normalize_matrix(matrix);
        }
    }

    /// Stable sort of routers by (outbound URL, path).
    ///
    /// Returns the permutation applied: `moved[new_index] == old_index`.
    pub fn sort_routers(&mut self) -> Vec<usize> {
        let mut indexed: Vec<(usize, Router)> =
            std::mem::take(&mut self.routers).into_iter().enumerate().collect();
        indexed.sort_by(|(_, a), (_, b)| a.sort_key().cmp(&b.sort_key()));
        let (moved, routers): (Vec<usize>, Vec<Router>) = indexed.into_iter().unzip();
        self.routers = routers;
        moved
    }
}

/// Sort alternatives by name with unnamed ones last, drop empty stages.
fn normalize_matrix(matrix: &mut Vec<Vec<Processor>>) {
    matrix.retain(|stage| !stage.is_empty());
    for stage in matrix.iter_mut() {
        for processor in stage.iter_mut() {
            processor.normalize();
        }
        stage.sort_by(|a, b| match (a.name.is_empty(), b.name.is_empty()) {
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            _ => a.name.cmp(&b.name),
        });
    }
}

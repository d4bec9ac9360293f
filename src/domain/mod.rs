//! Domain layer
//!
//! This module contains the typed configuration documents the editor works
//! on. They carry no knowledge of forms or storage; the sync engine maps them
//! onto the form tree and back.
//!
//! ## Module Organization
//!
//! - `gateway`: gateway listener, TLS, CORS, routers and processor pipelines
//! - `log_sink`: log shipping configuration
//! - `headers`: multi-valued header maps shared by both

pub mod gateway;
pub mod headers;
pub mod log_sink;

pub use gateway::{
    CorsSettings, GatewayConfig, GlobalHeaders, Outbound, Processor, ProcessorInput,
    ProcessorOutput, Router, TlsSettings,
};
pub use headers::Headers;
pub use log_sink::{
    AuthSettings, BatchSettings, DestinationSettings, FilterSettings, LogSinkConfig,
    RetentionSettings, SourceSettings,
};

//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use formplane::domain::{GatewayConfig, Headers, Outbound, Processor, Router};
use formplane::form::{Area, TooltipTable};
use formplane::sync::SyncContext;
use formplane::{Diagnostics, SyncEngine, ValidationReport};

pub fn router(path: &str, url: &str) -> Router {
    Router {
        path: path.to_string(),
        outbound: Outbound { url: url.to_string(), ..Outbound::default() },
        ..Router::default()
    }
}

pub fn processor(name: &str) -> Processor {
    Processor { name: name.to_string(), timeout_ms: 100, ..Processor::default() }
}

/// Gateway with two backends, a two-stage request pipeline and some headers.
pub fn sample_gateway() -> GatewayConfig {
    let mut config = GatewayConfig {
        name: "edge".to_string(),
        routers: vec![
            router("/orders/", "http://orders:8080"),
            router("/users/", "http://users:8080"),
            router("/carts/", "http://orders:8080"),
        ],
        request_processors: vec![
            vec![processor("auth")],
            vec![processor("geo"), processor("enrich"), processor("tag")],
        ],
        response_processors: vec![vec![processor("mask")]],
        ..GatewayConfig::default()
    };
    config.cors.allowed_origins = vec!["https://b.example".into(), "https://a.example".into()];
    config.headers.request = Headers::from([("x-gateway".to_string(), vec!["edge".to_string()])]);
    config
}

pub fn render<C: SyncEngine>(config: &C, report: &ValidationReport) -> Vec<Area> {
    let tooltips = TooltipTable::default();
    let diagnostics = Diagnostics::detached();
    config.create_areas(&SyncContext::new(report, &tooltips, &diagnostics)).unwrap()
}

pub fn area<'a>(areas: &'a mut [Area], key: &str) -> &'a mut Area {
    areas.iter_mut().find(|area| area.key == key).unwrap()
}

pub fn keys(area: &Area) -> Vec<&str> {
    area.nodes.iter().map(|node| node.key.as_str()).collect()
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

//! Integration tests for tree edits followed by a reverse sync

mod common;

use std::collections::BTreeMap;

use common::{area, keys, render, router, sample_gateway, strings};
use formplane::domain::GatewayConfig;
use formplane::edit::{self, processors};
use formplane::form::{FieldKind, FieldValue, InputNode};
use formplane::{Diagnostics, FormplaneError, SyncEngine, ValidationReport};

fn read_back(config: &GatewayConfig, areas: &[formplane::form::Area]) -> GatewayConfig {
    let diagnostics = Diagnostics::detached();
    let mut scratch = config.clone();
    scratch.set_config_from_areas(areas, &diagnostics).unwrap();
    scratch.update(&diagnostics).unwrap();
    scratch
}

#[test]
fn test_duplicate_router_key_law() {
    let diagnostics = Diagnostics::detached();
    let config = sample_gateway();
    let mut areas = render(&config, &ValidationReport::new());
    let routers = area(&mut areas, "routers");

    // rendered order is /carts/, /orders/, /users/
    edit::duplicate(&mut routers.nodes, "router1", FieldKind::RouterForm, &diagnostics).unwrap();

    let node_keys = keys(routers);
    assert_eq!(node_keys.iter().filter(|key| **key == "router1").count(), 1);
    assert_eq!(node_keys.iter().filter(|key| **key == "router1_copy").count(), 1);
    let copy_at = node_keys.iter().position(|key| *key == "router1_copy").unwrap();
    assert_eq!(node_keys[copy_at + 1], "router1");

    let FieldValue::RouterForm(copy) = &routers.nodes[copy_at].value else {
        panic!("expected router form")
    };
    assert_eq!(copy.path().unwrap().value, "/orders/copy/");

    let updated = read_back(&config, &areas);
    assert_eq!(updated.routers.len(), 4);
    assert!(updated.routers.iter().any(|r| r.path == "/orders/copy/"));
}

#[test]
fn test_deleting_sole_alternative_collapses_stage() {
    let diagnostics = Diagnostics::detached();
    let config = sample_gateway();
    let mut areas = render(&config, &ValidationReport::new());
    let pipeline = area(&mut areas, "request_processors");
    let before = pipeline.nodes.iter().filter(|n| n.kind() == FieldKind::ProcessorForm).count();

    processors::delete_alternative(&mut pipeline.nodes, "processor0_0", &diagnostics).unwrap();

    let after = pipeline.nodes.iter().filter(|n| n.kind() == FieldKind::ProcessorForm).count();
    assert_eq!(after, before - 1);
    assert_eq!(pipeline.nodes.iter().filter(|n| n.kind() == FieldKind::Label).count(), 1);

    let updated = read_back(&config, &areas);
    let names: Vec<Vec<&str>> = updated
        .request_processors
        .iter()
        .map(|stage| stage.iter().map(|p| p.name.as_str()).collect())
        .collect();
    assert_eq!(names, vec![vec!["enrich", "geo", "tag"]]);
}

#[test]
fn test_header_map_submission_semantics() {
    let diagnostics = Diagnostics::detached();
    let mut config = GatewayConfig::default();
    config.headers.request = BTreeMap::from([("my-header".to_string(), strings(&["before"]))]);
    let mut areas = render(&config, &ValidationReport::new());
    let headers = area(&mut areas, "headers");

    let error = edit::set_values(&mut headers.nodes, "request", None, &strings(&["my-header"]), &diagnostics)
        .unwrap_err();
    assert!(matches!(error, FormplaneError::Submission { .. }));
    assert_eq!(read_back(&config, &areas).headers.request, config.headers.request);

    let headers = area(&mut areas, "headers");
    edit::set_values(
        &mut headers.nodes,
        "request",
        None,
        &strings(&["my-header", "before", "my-header", "after"]),
        &diagnostics,
    )
    .unwrap();
    edit::set_values(
        &mut headers.nodes,
        "response",
        None,
        &strings(&["", "after", "another-header", "v1"]),
        &diagnostics,
    )
    .unwrap();

    let updated = read_back(&config, &areas);
    assert_eq!(
        updated.headers.request,
        BTreeMap::from([("my-header".to_string(), strings(&["after", "before"]))])
    );
    assert_eq!(
        updated.headers.response,
        BTreeMap::from([("another-header".to_string(), strings(&["v1"]))])
    );
}

#[test]
fn test_string_array_submission_drops_empty_and_sorts() {
    let diagnostics = Diagnostics::detached();
    let config = sample_gateway();
    let mut areas = render(&config, &ValidationReport::new());
    let cors = area(&mut areas, "cors");

    edit::set_values(&mut cors.nodes, "allowed_origins", None, &strings(&["one", "", "three"]), &diagnostics)
        .unwrap();

    assert_eq!(read_back(&config, &areas).cors.allowed_origins, strings(&["one", "three"]));
}

#[test]
fn test_duplicate_is_deep_copy() {
    let original = InputNode::text("greeting", "Greeting", "Hello");
    let copy = original.duplicate("greeting_copy");

    let mut original = original;
    original.value.set_value(&strings(&["test"])).unwrap();
    original.value.set_error("invalid", "changed");

    assert_eq!(copy.as_text().unwrap().value, "Hello");
    assert_eq!(copy.value.current_error(), "valid");
    assert_eq!(copy.value.current_error_tooltip(), "");
}

#[test]
fn test_reorder_reports_identity_remap() {
    let mut config = GatewayConfig {
        routers: vec![
            router("/a/", "http://u1"),
            router("/b/", "http://u1"),
            router("/c/", "http://u0"),
        ],
        ..GatewayConfig::default()
    };

    let changed = config.update(&Diagnostics::detached()).unwrap();

    assert_eq!(changed.get("router2").map(String::as_str), Some("router0"));
    assert_eq!(changed.get("router0").map(String::as_str), Some("router1"));
    assert_eq!(changed.get("router1").map(String::as_str), Some("router2"));
    assert_eq!(config.routers[0].path, "/c/");
}

#[test]
fn test_inserted_router_and_stage_survive_reverse_sync() {
    let diagnostics = Diagnostics::detached();
    let config = sample_gateway();
    let mut areas = render(&config, &ValidationReport::new());

    let pipeline = area(&mut areas, "response_processors");
    processors::insert_stage(&mut pipeline.nodes, "processor0_0", true, &diagnostics).unwrap();

    let updated = read_back(&config, &areas);
    assert_eq!(updated.response_processors.len(), 2);
    assert_eq!(updated.response_processors[1][0].name, "mask");
    assert!(updated.response_processors[0][0].name.is_empty());
}

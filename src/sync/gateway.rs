//! Sync engine of the gateway configuration

use crate::domain::gateway::{LOG_LEVELS, TLS_VERSIONS};
use crate::domain::{GatewayConfig, Processor, ProcessorInput, ProcessorOutput, Router};
use crate::errors::{FormplaneError, Result};
use crate::form::processor::{
    ASYNC_SLOT, INPUT_EXCLUDE_SLOT, INPUT_INCLUDE_SLOT, MODIFIER_SLOT, NAME_SLOT,
    OUTPUT_WRITE_SLOT, REQUIRED_SLOT, TIMEOUT_SLOT, TOPIC_SLOT,
};
use crate::form::router::{
    INGRESS_HEADERS_SLOT, OUTBOUND_ENDPOINT_SLOT, OUTBOUND_HEADERS_SLOT, OUTBOUND_URL_SLOT,
    PATH_SLOT,
};
use crate::form::{
    Area, FieldValue, InputNode, LabelValue, ProcessorFields, ProcessorFormValue, RouterFields,
    RouterFormValue, INVALID, REJECTED, VALID,
};
use crate::observability::Diagnostics;

use super::read::{
    check_areas, check_node_count, headers_from_entries, item_values, logged, parse_int,
    read_bool, read_choice, read_headers, read_int, read_label, read_strings, read_text,
};
use super::render::{rollup, Renderer};
use super::report::{ReportPath, ValidationReport, NOT_UNIQUE};
use super::{ChangedKeys, RepeatableKind, SyncContext, SyncEngine};

const GENERAL: usize = 0;
const TLS: usize = 1;
const CORS: usize = 2;
const HEADERS: usize = 3;
const ROUTERS: usize = 4;
const REQUEST_PROCESSORS: usize = 5;
const RESPONSE_PROCESSORS: usize = 6;

// general
const NAME: usize = 0;
const VERSION: usize = 1;
const LISTEN_PORT: usize = 2;
const LOG_LEVEL: usize = 3;
const TIMEOUT_MS: usize = 4;
const GENERAL_NODES: usize = 5;

// tls
const TLS_ENABLED: usize = 0;
const TLS_CERT_FILE: usize = 1;
const TLS_KEY_FILE: usize = 2;
const TLS_MIN_VERSION: usize = 3;
const TLS_NODES: usize = 4;

// cors
const CORS_ORIGINS: usize = 0;
const CORS_METHODS: usize = 1;
const CORS_HEADERS: usize = 2;
const CORS_CREDENTIALS: usize = 3;
const CORS_NODES: usize = 4;

// headers
const REQUEST_HEADERS: usize = 0;
const RESPONSE_HEADERS: usize = 1;
const HEADER_NODES: usize = 2;

/// Identity key of the router at `index`.
pub fn router_key(index: usize) -> String {
    format!("router{}", index)
}

/// Identity key of alternative `alternative` in stage `stage`.
pub fn processor_key(stage: usize, alternative: usize) -> String {
    format!("processor{}_{}", stage, alternative)
}

/// Identity key of the label opening stage `stage`.
pub fn stage_key(stage: usize) -> String {
    format!("stage{}", stage)
}

/// Report paths of the gateway sections.
struct Sections {
    root: ReportPath,
    tls: ReportPath,
    cors: ReportPath,
    headers: ReportPath,
    routers: ReportPath,
    request_processors: ReportPath,
    response_processors: ReportPath,
}

impl Sections {
    fn new() -> Self {
        let root = ReportPath::root(GatewayConfig::CONFIG_NAME);
        Self {
            tls: root.field("Tls"),
            cors: root.field("Cors"),
            headers: root.field("Headers"),
            routers: root.field("Routers"),
            request_processors: root.field("RequestProcessors"),
            response_processors: root.field("ResponseProcessors"),
            root,
        }
    }

    /// Rolled-up token of every area, in area order.
    fn rollups(&self, report: &ValidationReport) -> [String; 7] {
        let prefix = |path: &ReportPath| rollup(report.any_within(path));

        let others = [
            self.tls.clone(),
            self.cors.clone(),
            self.headers.clone(),
            self.routers.clone(),
            self.request_processors.clone(),
            self.response_processors.clone(),
        ];
        let general = rollup(report.any_outside(&others));

        let routers = match report.get(self.routers.as_str()) {
            Some(token) => token.to_string(),
            None if report.any_starting_with(&format!("{}[", self.routers)) => INVALID.to_string(),
            None => VALID.to_string(),
        };

        [
            general,
            prefix(&self.tls),
            prefix(&self.cors),
            prefix(&self.headers),
            routers,
            prefix(&self.request_processors),
            prefix(&self.response_processors),
        ]
    }
}

impl SyncEngine for GatewayConfig {
    const CONFIG_NAME: &'static str = "GatewayConfig";

    const AREAS: &'static [(&'static str, &'static str)] = &[
        ("general", "General"),
        ("tls", "TLS"),
        ("cors", "CORS"),
        ("headers", "Global headers"),
        ("routers", "Routers"),
        ("request_processors", "Request processors"),
        ("response_processors", "Response processors"),
    ];

    fn update_areas_from_config(&self, ctx: &SyncContext<'_>, areas: &mut [Area]) -> Result<()> {
        let span = ctx.diagnostics.sync("update_areas_from_config");
        let _guard = span.enter();
        logged(ctx.diagnostics, "update_areas_from_config", self.render(ctx, areas))
    }

    fn set_config_from_areas(&mut self, areas: &[Area], diagnostics: &Diagnostics) -> Result<()> {
        let span = diagnostics.sync("set_config_from_areas");
        let _guard = span.enter();
        let scratch =
            logged(diagnostics, "set_config_from_areas", self.read_areas(areas, diagnostics))?;
        *self = scratch;
        Ok(())
    }

    fn update(&mut self, diagnostics: &Diagnostics) -> Result<ChangedKeys> {
        let span = diagnostics.sync("update");
        let _guard = span.enter();

        self.normalize_collections();
        let moved = self.sort_routers();
        let changed: ChangedKeys = moved
            .iter()
            .enumerate()
            .filter(|&(new, &old)| new != old)
            .map(|(new, &old)| (router_key(old), router_key(new)))
            .collect();

        if !changed.is_empty() {
            tracing::debug!(moved = changed.len(), "routers reordered");
        }
        Ok(changed)
    }

    fn repeatable(area_key: &str) -> Option<RepeatableKind> {
        match area_key {
            "routers" => Some(RepeatableKind::Router),
            "request_processors" | "response_processors" => Some(RepeatableKind::ProcessorMatrix),
            _ => None,
        }
    }
}

impl GatewayConfig {
    fn render(&self, ctx: &SyncContext<'_>, areas: &mut [Area]) -> Result<()> {
        check_areas(Self::CONFIG_NAME, areas, &Self::area_keys())?;
        let r = Renderer::new(ctx.report, ctx.tooltips);
        let sections = Sections::new();
        let root = &sections.root;

        let mut version =
            InputNode::new("version", "Version", FieldValue::Label(LabelValue::new(&self.version)));
        r.mark(&mut version.value, &root.field("Version"));
        areas[GENERAL].nodes = vec![
            r.text("name", "Name", &self.name, &root.field("Name")),
            version,
            r.int("listen_port", "Listen port", self.listen_port, &root.field("ListenPort")),
            r.choice("log_level", "Log level", &self.log_level, &LOG_LEVELS, &root.field("LogLevel")),
            r.int("timeout_ms", "Timeout (ms)", self.timeout_ms, &root.field("TimeoutMs")),
        ];

        let tls = &sections.tls;
        areas[TLS].nodes = vec![
            r.toggle("enabled", "Enabled", self.tls.enabled, &tls.field("Enabled")),
            r.text("cert_file", "Certificate file", &self.tls.cert_file, &tls.field("CertFile")),
            r.text("key_file", "Key file", &self.tls.key_file, &tls.field("KeyFile")),
            r.choice(
                "min_version",
                "Minimum version",
                &self.tls.min_version,
                &TLS_VERSIONS,
                &tls.field("MinVersion"),
            ),
        ];

        let cors = &sections.cors;
        areas[CORS].nodes = vec![
            r.strings(
                "allowed_origins",
                "Allowed origins",
                &self.cors.allowed_origins,
                &cors.field("AllowedOrigins"),
            ),
            r.strings(
                "allowed_methods",
                "Allowed methods",
                &self.cors.allowed_methods,
                &cors.field("AllowedMethods"),
            ),
            r.strings(
                "allowed_headers",
                "Allowed headers",
                &self.cors.allowed_headers,
                &cors.field("AllowedHeaders"),
            ),
            r.toggle(
                "allow_credentials",
                "Allow credentials",
                self.cors.allow_credentials,
                &cors.field("AllowCredentials"),
            ),
        ];

        let headers = &sections.headers;
        areas[HEADERS].nodes = vec![
            r.headers("request", "Request headers", &self.headers.request, &headers.field("Request")),
            r.headers(
                "response",
                "Response headers",
                &self.headers.response,
                &headers.field("Response"),
            ),
        ];

        areas[ROUTERS].nodes = self.router_nodes(&r, &sections.routers)?;
        areas[REQUEST_PROCESSORS].nodes =
            processor_nodes(&r, &self.request_processors, &sections.request_processors)?;
        areas[RESPONSE_PROCESSORS].nodes =
            processor_nodes(&r, &self.response_processors, &sections.response_processors)?;

        for (area, token) in areas.iter_mut().zip(sections.rollups(ctx.report)) {
            area.set_error(token, ctx.tooltips);
        }
        Ok(())
    }

    /// Routers ordered by (outbound URL, path) with one label per distinct URL.
    ///
    /// Router keys follow the rendered position, which is the index reverse
    /// sync hands to `update`. Findings are still looked up at the stored index.
    fn router_nodes(&self, r: &Renderer<'_>, section: &ReportPath) -> Result<Vec<InputNode>> {
        let mut ordered: Vec<(usize, &Router)> = self.routers.iter().enumerate().collect();
        ordered.sort_by(|(_, a), (_, b)| a.sort_key().cmp(&b.sort_key()));

        let mut nodes = Vec::with_capacity(self.routers.len() * 2);
        let mut previous_url: Option<&str> = None;
        let mut labels = 0;

        for (position, (index, router)) in ordered.into_iter().enumerate() {
            let url = router.outbound.url.as_str();
            if previous_url != Some(url) {
                nodes.push(
                    r.label(&format!("url{}", labels), url)
                        .with_tooltip("Routers below forward to this backend"),
                );
                labels += 1;
                previous_url = Some(url);
            }
            nodes.push(router_node(r, router, position, &section.index(index))?);
        }
        Ok(nodes)
    }

    fn read_areas(&self, areas: &[Area], diagnostics: &Diagnostics) -> Result<GatewayConfig> {
        check_areas(Self::CONFIG_NAME, areas, &Self::area_keys())?;
        let mut scratch = self.clone();

        let general = &areas[GENERAL];
        check_node_count(general, GENERAL_NODES)?;
        let nodes = &general.nodes;
        scratch.name = read_text(nodes, NAME)?;
        read_label(nodes, VERSION)?;
        scratch.listen_port = read_int(nodes, LISTEN_PORT, self.listen_port, diagnostics)?;
        scratch.log_level = read_choice(nodes, LOG_LEVEL)?;
        scratch.timeout_ms = read_int(nodes, TIMEOUT_MS, self.timeout_ms, diagnostics)?;

        let tls = &areas[TLS];
        check_node_count(tls, TLS_NODES)?;
        scratch.tls.enabled = read_bool(&tls.nodes, TLS_ENABLED)?;
        scratch.tls.cert_file = read_text(&tls.nodes, TLS_CERT_FILE)?;
        scratch.tls.key_file = read_text(&tls.nodes, TLS_KEY_FILE)?;
        scratch.tls.min_version = read_choice(&tls.nodes, TLS_MIN_VERSION)?;

        let cors = &areas[CORS];
        check_node_count(cors, CORS_NODES)?;
        scratch.cors.allowed_origins = read_strings(&cors.nodes, CORS_ORIGINS)?;
        scratch.cors.allowed_methods = read_strings(&cors.nodes, CORS_METHODS)?;
        scratch.cors.allowed_headers = read_strings(&cors.nodes, CORS_HEADERS)?;
        scratch.cors.allow_credentials = read_bool(&cors.nodes, CORS_CREDENTIALS)?;

        let headers = &areas[HEADERS];
        check_node_count(headers, HEADER_NODES)?;
        scratch.headers.request = read_headers(&headers.nodes, REQUEST_HEADERS)?;
        scratch.headers.response = read_headers(&headers.nodes, RESPONSE_HEADERS)?;

        scratch.routers = read_routers(&areas[ROUTERS])?;
        scratch.request_processors =
            read_matrix(&areas[REQUEST_PROCESSORS], &self.request_processors, diagnostics)?;
        scratch.response_processors =
            read_matrix(&areas[RESPONSE_PROCESSORS], &self.response_processors, diagnostics)?;

        tracing::debug!(
            routers = scratch.routers.len(),
            request_stages = scratch.request_processors.len(),
            response_stages = scratch.response_processors.len(),
            "read gateway areas"
        );
        Ok(scratch)
    }
}

fn router_node(
    r: &Renderer<'_>,
    router: &Router,
    index: usize,
    element: &ReportPath,
) -> Result<InputNode> {
    let ingress = element.field("IngressHeaders");
    let outbound = element.field("Outbound");
    let outbound_headers = outbound.field("Headers");

    let mut form = RouterFormValue::new(RouterFields {
        path: router.path.clone(),
        ingress_headers: r.header_entries(&router.ingress_headers, &ingress),
        outbound_url: router.outbound.url.clone(),
        outbound_endpoint: router.outbound.endpoint.clone(),
        outbound_headers: r.header_entries(&router.outbound.headers, &outbound_headers),
    });
    let slots = [
        (PATH_SLOT, element.field("Path")),
        (INGRESS_HEADERS_SLOT, ingress),
        (OUTBOUND_URL_SLOT, outbound.field("Url")),
        (OUTBOUND_ENDPOINT_SLOT, outbound.field("Endpoint")),
        (OUTBOUND_HEADERS_SLOT, outbound_headers),
    ];
    for (slot, path) in &slots {
        r.mark(&mut form.slot_mut(*slot)?.value, path);
    }

    let token = if r.report().get(element.as_str()) == Some(NOT_UNIQUE) { REJECTED } else { VALID };
    let mut node = InputNode::new(
        router_key(index),
        format!("Router {}", index + 1),
        FieldValue::RouterForm(form),
    );
    r.mark_token(&mut node.value, token);
    Ok(node)
}

fn processor_nodes(
    r: &Renderer<'_>,
    matrix: &[Vec<Processor>],
    section: &ReportPath,
) -> Result<Vec<InputNode>> {
    let mut nodes = Vec::new();
    for (stage, alternatives) in matrix.iter().enumerate() {
        nodes.push(
            r.label(&stage_key(stage), format!("Stage {}", stage + 1))
                .with_tooltip("Alternatives in a stage are candidates for the same step"),
        );
        for (alternative, processor) in alternatives.iter().enumerate() {
            let element = section.index(stage).index(alternative);
            nodes.push(processor_node(r, processor, processor_key(stage, alternative), &element)?);
        }
    }
    Ok(nodes)
}

fn processor_node(
    r: &Renderer<'_>,
    processor: &Processor,
    key: String,
    element: &ReportPath,
) -> Result<InputNode> {
    let include = element.field("Input").field("Include");
    let exclude = element.field("Input").field("Exclude");
    let write = element.field("Output").field("Write");

    let mut form = ProcessorFormValue::new(ProcessorFields {
        name: processor.name.clone(),
        modifier: processor.modifier,
        required: processor.required,
        is_async: processor.is_async,
        input_include: r.items(&processor.input.include, &include),
        input_exclude: r.items(&processor.input.exclude, &exclude),
        output_write: r.items(&processor.output.write, &write),
        topic: processor.topic.clone(),
        timeout: processor.timeout_ms.to_string(),
    });
    let slots = [
        (NAME_SLOT, element.field("Name")),
        (MODIFIER_SLOT, element.field("Modifier")),
        (REQUIRED_SLOT, element.field("Required")),
        (ASYNC_SLOT, element.field("Async")),
        (INPUT_INCLUDE_SLOT, include),
        (INPUT_EXCLUDE_SLOT, exclude),
        (OUTPUT_WRITE_SLOT, write),
        (TOPIC_SLOT, element.field("Topic")),
        (TIMEOUT_SLOT, element.field("TimeoutMs")),
    ];
    for (slot, path) in &slots {
        r.mark(&mut form.slot_mut(*slot)?.value, path);
    }

    let label = if processor.name.is_empty() { "Processor" } else { processor.name.as_str() };
    let mut node = InputNode::new(key, label, FieldValue::ProcessorForm(form));
    r.mark(&mut node.value, element);
    Ok(node)
}

fn unexpected(area: &Area, node: &InputNode, expected: &str) -> FormplaneError {
    FormplaneError::structural(
        format!("area '{}'", area.key),
        format!("node '{}' is {}, expected {} or label", node.key, node.kind(), expected),
    )
}

/// Routers as many as the tree holds, values copied slot by slot.
fn read_routers(area: &Area) -> Result<Vec<Router>> {
    let mut forms = Vec::new();
    for node in &area.nodes {
        match &node.value {
            FieldValue::RouterForm(form) => forms.push((node.key.as_str(), form)),
            FieldValue::Label(_) => {}
            _ => return Err(unexpected(area, node, "router_form")),
        }
    }

    let mut routers = vec![Router::default(); forms.len()];
    for (router, (key, form)) in routers.iter_mut().zip(forms) {
        let fields = form.fields().map_err(|e| e.add_context(key))?;
        router.path = fields.path;
        router.ingress_headers = headers_from_entries(&fields.ingress_headers);
        router.outbound.url = fields.outbound_url;
        router.outbound.endpoint = fields.outbound_endpoint;
        router.outbound.headers = headers_from_entries(&fields.outbound_headers);
    }
    Ok(routers)
}

/// Stage × alternative matrix as the tree lays it out.
///
/// A label opens a stage, a processor joins the open one, and stages left
/// without processors disappear.
fn read_matrix(
    area: &Area,
    current: &[Vec<Processor>],
    diagnostics: &Diagnostics,
) -> Result<Vec<Vec<Processor>>> {
    let mut shape: Vec<Vec<(&str, &ProcessorFormValue)>> = Vec::new();
    for node in &area.nodes {
        match &node.value {
            FieldValue::Label(_) => shape.push(Vec::new()),
            FieldValue::ProcessorForm(form) => match shape.last_mut() {
                Some(stage) => stage.push((node.key.as_str(), form)),
                None => shape.push(vec![(node.key.as_str(), form)]),
            },
            _ => return Err(unexpected(area, node, "processor_form")),
        }
    }
    shape.retain(|stage| !stage.is_empty());

    let mut matrix = Vec::with_capacity(shape.len());
    for (s, stage) in shape.into_iter().enumerate() {
        let mut alternatives = Vec::with_capacity(stage.len());
        for (a, (key, form)) in stage.into_iter().enumerate() {
            let fields = form.fields().map_err(|e| e.add_context(key))?;
            let stored = current.get(s).and_then(|row| row.get(a)).map_or(0, |p| p.timeout_ms);
            alternatives.push(Processor {
                name: fields.name,
                modifier: fields.modifier,
                required: fields.required,
                is_async: fields.is_async,
                input: ProcessorInput {
                    include: item_values(&fields.input_include),
                    exclude: item_values(&fields.input_exclude),
                },
                output: ProcessorOutput { write: item_values(&fields.output_write) },
                topic: fields.topic,
                timeout_ms: parse_int(key, &fields.timeout, stored, diagnostics),
            });
        }
        matrix.push(alternatives);
    }
    Ok(matrix)
}

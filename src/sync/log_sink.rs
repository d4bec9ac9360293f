//! Sync engine of the log-sink configuration
//!
//! Every area has a fixed shape, so reverse sync is purely positional and
//! `update` never moves anything with an identity.

use crate::domain::log_sink::{AUTH_MODES, FORMATS};
use crate::domain::LogSinkConfig;
use crate::errors::Result;
use crate::form::Area;
use crate::observability::Diagnostics;

use super::read::{
    check_areas, check_node_count, logged, read_bool, read_choice, read_headers, read_int,
    read_strings, read_text,
};
use super::render::{rollup, Renderer};
use super::report::{ReportPath, ValidationReport};
use super::{ChangedKeys, RepeatableKind, SyncContext, SyncEngine};

const GENERAL: usize = 0;
const SOURCE: usize = 1;
const FILTER: usize = 2;
const DESTINATION: usize = 3;
const BATCHING: usize = 4;
const AUTH: usize = 5;
const RETENTION: usize = 6;

/// Report field of every non-general section, in area order.
const SECTION_FIELDS: [&str; 6] =
    ["Source", "Filter", "Destination", "Batching", "Auth", "Retention"];

fn section_rollups(report: &ValidationReport) -> Vec<String> {
    let root = ReportPath::root(LogSinkConfig::CONFIG_NAME);
    let sections: Vec<ReportPath> = SECTION_FIELDS.iter().map(|field| root.field(field)).collect();

    let mut tokens = vec![rollup(report.any_outside(&sections))];
    for (index, section) in sections.iter().enumerate() {
        let token = if index + 1 == DESTINATION {
            match report.get(section.as_str()) {
                Some(token) => token.to_string(),
                None => rollup(report.any_within(section)),
            }
        } else {
            rollup(report.any_within(section))
        };
        tokens.push(token);
    }
    tokens
}

impl SyncEngine for LogSinkConfig {
    const CONFIG_NAME: &'static str = "LogSinkConfig";

    const AREAS: &'static [(&'static str, &'static str)] = &[
        ("general", "General"),
        ("source", "Source"),
        ("filter", "Filter"),
        ("destination", "Destination"),
        ("batching", "Batching"),
        ("auth", "Authentication"),
        ("retention", "Retention"),
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
        Ok(ChangedKeys::new())
    }

    fn repeatable(_area_key: &str) -> Option<RepeatableKind> {
        None
    }
}

impl LogSinkConfig {
    fn render(&self, ctx: &SyncContext<'_>, areas: &mut [Area]) -> Result<()> {
        check_areas(Self::CONFIG_NAME, areas, &Self::area_keys())?;
        let r = Renderer::new(ctx.report, ctx.tooltips);
        let root = ReportPath::root(Self::CONFIG_NAME);

        areas[GENERAL].nodes = vec![
            r.text("name", "Name", &self.name, &root.field("Name")),
            r.toggle("enabled", "Enabled", self.enabled, &root.field("Enabled")),
            r.choice("format", "Format", &self.format, &FORMATS, &root.field("Format")),
        ];

        let source = root.field("Source");
        areas[SOURCE].nodes = vec![
            r.text(
                "listen_address",
                "Listen address",
                &self.source.listen_address,
                &source.field("ListenAddress"),
            ),
            r.strings("topics", "Topics", &self.source.topics, &source.field("Topics")),
        ];

        let filter = root.field("Filter");
        areas[FILTER].nodes = vec![
            r.strings("levels", "Levels", &self.filter.levels, &filter.field("Levels")),
            r.strings(
                "drop_fields",
                "Dropped fields",
                &self.filter.drop_fields,
                &filter.field("DropFields"),
            ),
            r.int("sample_rate", "Sample rate (%)", self.filter.sample_rate, &filter.field("SampleRate")),
        ];

        let destination = root.field("Destination");
        areas[DESTINATION].nodes = vec![
            r.text("url", "URL", &self.destination.url, &destination.field("Url")),
            r.text("index", "Index", &self.destination.index, &destination.field("Index")),
            r.headers("headers", "Headers", &self.destination.headers, &destination.field("Headers")),
        ];

        let batching = root.field("Batching");
        areas[BATCHING].nodes = vec![
            r.int("max_events", "Max events", self.batching.max_events, &batching.field("MaxEvents")),
            r.int(
                "flush_interval_ms",
                "Flush interval (ms)",
                self.batching.flush_interval_ms,
                &batching.field("FlushIntervalMs"),
            ),
            r.int("max_retries", "Max retries", self.batching.max_retries, &batching.field("MaxRetries")),
        ];

        let auth = root.field("Auth");
        areas[AUTH].nodes = vec![
            r.choice("mode", "Mode", &self.auth.mode, &AUTH_MODES, &auth.field("Mode")),
            r.text("username", "Username", &self.auth.username, &auth.field("Username")),
            r.text("secret_ref", "Secret reference", &self.auth.secret_ref, &auth.field("SecretRef")),
        ];

        let retention = root.field("Retention");
        areas[RETENTION].nodes = vec![
            r.int("days", "Days", self.retention.days, &retention.field("Days")),
            r.toggle("compress", "Compress", self.retention.compress, &retention.field("Compress")),
            r.text(
                "archive_path",
                "Archive path",
                &self.retention.archive_path,
                &retention.field("ArchivePath"),
            ),
        ];

        for (area, token) in areas.iter_mut().zip(section_rollups(ctx.report)) {
            area.set_error(token, ctx.tooltips);
        }
        Ok(())
    }

    fn read_areas(&self, areas: &[Area], diagnostics: &Diagnostics) -> Result<LogSinkConfig> {
        check_areas(Self::CONFIG_NAME, areas, &Self::area_keys())?;
        let mut scratch = self.clone();

        let general = &areas[GENERAL];
        check_node_count(general, 3)?;
        scratch.name = read_text(&general.nodes, 0)?;
        scratch.enabled = read_bool(&general.nodes, 1)?;
        scratch.format = read_choice(&general.nodes, 2)?;

        let source = &areas[SOURCE];
        check_node_count(source, 2)?;
        scratch.source.listen_address = read_text(&source.nodes, 0)?;
        scratch.source.topics = read_strings(&source.nodes, 1)?;

        let filter = &areas[FILTER];
        check_node_count(filter, 3)?;
        scratch.filter.levels = read_strings(&filter.nodes, 0)?;
        scratch.filter.drop_fields = read_strings(&filter.nodes, 1)?;
        scratch.filter.sample_rate =
            read_int(&filter.nodes, 2, self.filter.sample_rate, diagnostics)?;

        let destination = &areas[DESTINATION];
        check_node_count(destination, 3)?;
        scratch.destination.url = read_text(&destination.nodes, 0)?;
        scratch.destination.index = read_text(&destination.nodes, 1)?;
        scratch.destination.headers = read_headers(&destination.nodes, 2)?;

        let batching = &areas[BATCHING];
        check_node_count(batching, 3)?;
        scratch.batching.max_events =
            read_int(&batching.nodes, 0, self.batching.max_events, diagnostics)?;
        scratch.batching.flush_interval_ms =
            read_int(&batching.nodes, 1, self.batching.flush_interval_ms, diagnostics)?;
        scratch.batching.max_retries =
            read_int(&batching.nodes, 2, self.batching.max_retries, diagnostics)?;

        let auth = &areas[AUTH];
        check_node_count(auth, 3)?;
        scratch.auth.mode = read_choice(&auth.nodes, 0)?;
        scratch.auth.username = read_text(&auth.nodes, 1)?;
        scratch.auth.secret_ref = read_text(&auth.nodes, 2)?;

        let retention = &areas[RETENTION];
        check_node_count(retention, 3)?;
        scratch.retention.days = read_int(&retention.nodes, 0, self.retention.days, diagnostics)?;
        scratch.retention.compress = read_bool(&retention.nodes, 1)?;
        scratch.retention.archive_path = read_text(&retention.nodes, 2)?;

        Ok(scratch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Headers;
    use crate::form::{TooltipTable, INVALID};

    fn sample() -> LogSinkConfig {
        let mut config = LogSinkConfig { name: "audit".to_string(), ..LogSinkConfig::default() };
        config.source.topics = vec!["gateway".to_string(), "access".to_string()];
        config.destination.url = "https://logs.example.com".to_string();
        config.destination.headers =
            Headers::from([("authorization".to_string(), vec!["token".to_string()])]);
        config
    }

    fn render(config: &LogSinkConfig, report: &ValidationReport) -> Vec<Area> {
        let tooltips = TooltipTable::default();
        let diagnostics = Diagnostics::detached();
        config.create_areas(&SyncContext::new(report, &tooltips, &diagnostics)).unwrap()
    }

    fn report(entries: &[(&str, &str)]) -> ValidationReport {
        entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn round_trip_after_update() {
        let diagnostics = Diagnostics::detached();
        let mut config = sample();
        assert!(config.update(&diagnostics).unwrap().is_empty());
        assert_eq!(config.source.topics, vec!["access", "gateway"]);

        let areas = render(&config, &ValidationReport::new());
        assert!(areas.iter().all(Area::is_valid));
        let mut restored = LogSinkConfig::default();
        restored.set_config_from_areas(&areas, &diagnostics).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn destination_rollup_uses_exact_token() {
        let areas = render(&sample(), &report(&[("LogSinkConfig.Destination", "unreachable")]));
        assert_eq!(areas[DESTINATION].error, "unreachable");
        assert_eq!(areas[DESTINATION].tooltip, "The destination did not answer during validation.");

        let areas =
            render(&sample(), &report(&[("LogSinkConfig.Destination.Url", "malformed_url")]));
        assert_eq!(areas[DESTINATION].error, INVALID);
        assert_eq!(areas[DESTINATION].nodes[0].value.current_error(), "malformed_url");
        assert!(areas[GENERAL].is_valid());
    }

    #[test]
    fn general_rollup_is_catch_all() {
        let areas = render(&sample(), &report(&[("LogSinkConfig.Name", "required")]));
        assert_eq!(areas[GENERAL].error, INVALID);
        assert!(!areas.iter().all(Area::is_valid));

        let areas = render(&sample(), &report(&[("LogSinkConfig.Retention.Days", "out_of_range")]));
        assert!(areas[GENERAL].is_valid());
        assert_eq!(areas[RETENTION].error, INVALID);
    }

    #[test]
    fn wrong_node_count_is_structural() {
        let config = sample();
        let mut areas = render(&config, &ValidationReport::new());
        areas[AUTH].nodes.pop();
        let mut edited = config.clone();
        assert!(edited
            .set_config_from_areas(&areas, &Diagnostics::detached())
            .unwrap_err()
            .is_structural());
        assert_eq!(edited, config);
    }

    #[test]
    fn edited_values_are_read_positionally() {
        let config = sample();
        let mut areas = render(&config, &ValidationReport::new());
        areas[BATCHING].nodes[0].value.set_value(&["2000".to_string()]).unwrap();
        areas[AUTH].nodes[0].value.set_value(&["bearer".to_string()]).unwrap();
        areas[AUTH].nodes[0].value.set_value(&["kerberos".to_string()]).unwrap();

        let mut edited = config.clone();
        edited.set_config_from_areas(&areas, &Diagnostics::detached()).unwrap();
        assert_eq!(edited.batching.max_events, 2000);
        assert_eq!(edited.auth.mode, "bearer");
    }
}

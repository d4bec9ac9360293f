//! Config → form helpers shared by the sync engines
//!
//! Every helper looks up the node's finding at its exact report path and
//! attaches the matching tooltip. Collections are rendered sorted, but item
//! findings are looked up by the item's position in the config.

use crate::domain::Headers;
use crate::form::{ArrayItem, FieldValue, HeaderEntry, InputNode, TooltipTable, INVALID, VALID};

use super::report::{ReportPath, ValidationReport};

/// Section token for a prefix or catch-all rollup.
pub(crate) fn rollup(flagged: bool) -> String {
    let token = if flagged { INVALID } else { VALID };
    token.to_string()
}

pub(crate) struct Renderer<'a> {
    report: &'a ValidationReport,
    tooltips: &'a TooltipTable,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(report: &'a ValidationReport, tooltips: &'a TooltipTable) -> Self {
        Self { report, tooltips }
    }

    pub(crate) fn report(&self) -> &'a ValidationReport {
        self.report
    }

    /// Attach the finding at `path` to `value`.
    pub(crate) fn mark(&self, value: &mut FieldValue, path: &ReportPath) {
        self.mark_token(value, self.report.token(path));
    }

    pub(crate) fn mark_token(&self, value: &mut FieldValue, token: &str) {
        value.set_error(token, self.tooltips.lookup(token));
    }

    fn marked(&self, mut node: InputNode, path: &ReportPath) -> InputNode {
        self.mark(&mut node.value, path);
        node
    }

    pub(crate) fn text(
        &self,
        key: &str,
        label: &str,
        value: impl Into<String>,
        path: &ReportPath,
    ) -> InputNode {
        self.marked(InputNode::text(key, label, value), path)
    }

    pub(crate) fn int(&self, key: &str, label: &str, value: i64, path: &ReportPath) -> InputNode {
        self.text(key, label, value.to_string(), path)
    }

    pub(crate) fn toggle(&self, key: &str, label: &str, value: bool, path: &ReportPath) -> InputNode {
        self.marked(InputNode::toggle(key, label, value), path)
    }

    pub(crate) fn choice(
        &self,
        key: &str,
        label: &str,
        value: &str,
        options: &[&str],
        path: &ReportPath,
    ) -> InputNode {
        self.marked(InputNode::choice(key, label, value, options), path)
    }

    pub(crate) fn label(&self, key: &str, text: impl Into<String>) -> InputNode {
        InputNode::label_node(key, text)
    }

    pub(crate) fn strings(
        &self,
        key: &str,
        label: &str,
        values: &[String],
        path: &ReportPath,
    ) -> InputNode {
        self.marked(InputNode::strings(key, label, self.items(values, path)), path)
    }

    pub(crate) fn headers(
        &self,
        key: &str,
        label: &str,
        headers: &Headers,
        path: &ReportPath,
    ) -> InputNode {
        self.marked(InputNode::headers(key, label, self.header_entries(headers, path)), path)
    }

    /// Sorted items carrying the finding of their config index.
    pub(crate) fn items(&self, values: &[String], path: &ReportPath) -> Vec<ArrayItem> {
        let mut indexed: Vec<(usize, &String)> = values.iter().enumerate().collect();
        indexed.sort_by(|a, b| a.1.cmp(b.1));
        indexed
            .into_iter()
            .map(|(index, value)| {
                ArrayItem::with_error(value.clone(), self.report.token(&path.index(index)))
            })
            .collect()
    }

    pub(crate) fn header_entries(&self, headers: &Headers, path: &ReportPath) -> Vec<HeaderEntry> {
        headers
            .iter()
            .map(|(name, values)| {
                let entry_path = path.key(name);
                HeaderEntry {
                    name: name.clone(),
                    values: self.items(values, &entry_path),
                    error: self.report.token(&entry_path).to_string(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_keep_findings_of_config_index() {
        let mut report = ValidationReport::new();
        report.insert("Cfg.List[0]", "required");
        let tooltips = TooltipTable::default();
        let renderer = Renderer::new(&report, &tooltips);

        let values = vec!["zeta".to_string(), "alpha".to_string()];
        let items = renderer.items(&values, &ReportPath::root("Cfg").field("List"));

        assert_eq!(items[0], ArrayItem::with_error("alpha", VALID));
        assert_eq!(items[1], ArrayItem::with_error("zeta", "required"));
    }

    #[test]
    fn header_entries_carry_entry_and_value_findings() {
        let mut report = ValidationReport::new();
        report.insert("Cfg.Headers[x bad]", "invalid_header_name");
        report.insert("Cfg.Headers[x-ok][1]", "required");
        let tooltips = TooltipTable::default();
        let renderer = Renderer::new(&report, &tooltips);

        let headers = Headers::from([
            ("x bad".to_string(), vec!["1".to_string()]),
            ("x-ok".to_string(), vec!["b".to_string(), String::new()]),
        ]);
        let entries = renderer.header_entries(&headers, &ReportPath::root("Cfg").field("Headers"));

        assert_eq!(entries[0].error, "invalid_header_name");
        assert_eq!(entries[1].error, VALID);
        assert_eq!(entries[1].values[0], ArrayItem::with_error("", "required"));
        assert_eq!(entries[1].values[1], ArrayItem::with_error("b", VALID));
    }

    #[test]
    fn leaf_nodes_get_tooltips() {
        let mut report = ValidationReport::new();
        report.insert("Cfg.Name", "required");
        let tooltips = TooltipTable::default();
        let renderer = Renderer::new(&report, &tooltips);

        let node = renderer.text("name", "Name", "", &ReportPath::root("Cfg").field("Name"));
        assert_eq!(node.value.current_error(), "required");
        assert_eq!(node.value.current_error_tooltip(), "This field must not be empty.");
    }
}

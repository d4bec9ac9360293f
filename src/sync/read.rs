//! Form → config helpers shared by the sync engines
//!
//! Fixed sections are read positionally; every accessor checks the variant at
//! the slot and fails structurally on a mismatch.

use crate::domain::Headers;
use crate::errors::{FormplaneError, Result};
use crate::form::{Area, HeaderEntry, InputNode};
use crate::observability::Diagnostics;

/// Check the area count and key sequence of a config type.
pub(crate) fn check_areas(config_name: &str, areas: &[Area], expected: &[&str]) -> Result<()> {
    if areas.len() != expected.len() {
        return Err(FormplaneError::structural(
            format!("{} areas", config_name),
            format!("expected {} areas, found {}", expected.len(), areas.len()),
        ));
    }
    for (index, (area, key)) in areas.iter().zip(expected).enumerate() {
        if area.key != *key {
            return Err(FormplaneError::structural(
                format!("{} areas", config_name),
                format!("area {} should be '{}', found '{}'", index, key, area.key),
            ));
        }
    }
    Ok(())
}

/// Check the node count of a fixed-shape area.
pub(crate) fn check_node_count(area: &Area, expected: usize) -> Result<()> {
    if area.nodes.len() != expected {
        return Err(FormplaneError::structural(
            format!("area '{}'", area.key),
            format!("expected {} nodes, found {}", expected, area.nodes.len()),
        ));
    }
    Ok(())
}

fn slot(nodes: &[InputNode], index: usize) -> Result<&InputNode> {
    nodes.get(index).ok_or_else(|| {
        FormplaneError::structural("fixed slots", format!("no node at slot {}", index))
    })
}

pub(crate) fn read_text(nodes: &[InputNode], index: usize) -> Result<String> {
    Ok(slot(nodes, index)?.as_text()?.value.clone())
}

pub(crate) fn read_choice(nodes: &[InputNode], index: usize) -> Result<String> {
    Ok(slot(nodes, index)?.as_choice()?.value.clone())
}

pub(crate) fn read_bool(nodes: &[InputNode], index: usize) -> Result<bool> {
    Ok(slot(nodes, index)?.as_choice()?.is_true())
}

pub(crate) fn read_strings(nodes: &[InputNode], index: usize) -> Result<Vec<String>> {
    Ok(slot(nodes, index)?.as_strings()?.values())
}

pub(crate) fn read_headers(nodes: &[InputNode], index: usize) -> Result<Headers> {
    Ok(headers_from_entries(&slot(nodes, index)?.as_headers()?.entries))
}

pub(crate) fn read_label(nodes: &[InputNode], index: usize) -> Result<()> {
    slot(nodes, index)?.as_label().map(|_| ())
}

/// Integer held in a text slot.
pub(crate) fn read_int(
    nodes: &[InputNode],
    index: usize,
    current: i64,
    diagnostics: &Diagnostics,
) -> Result<i64> {
    let node = slot(nodes, index)?;
    Ok(parse_int(&node.key, &node.as_text()?.value, current, diagnostics))
}

/// Empty text reads as zero. Text that is not a number keeps `current` so a
/// typo never wipes a stored value.
pub(crate) fn parse_int(key: &str, text: &str, current: i64, diagnostics: &Diagnostics) -> i64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0;
    }
    match trimmed.parse::<i64>() {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                parent: diagnostics.span(),
                key,
                text = trimmed,
                error = %error,
                "ignoring non-numeric input, keeping stored value"
            );
            current
        }
    }
}

pub(crate) fn headers_from_entries(entries: &[HeaderEntry]) -> Headers {
    let mut headers = Headers::new();
    for entry in entries {
        headers
            .entry(entry.name.clone())
            .or_default()
            .extend(entry.values.iter().map(|item| item.value.clone()));
    }
    headers
}

pub(crate) fn item_values(items: &[crate::form::ArrayItem]) -> Vec<String> {
    items.iter().map(|item| item.value.clone()).collect()
}

/// Log a structural failure on its way out of an engine operation.
pub(crate) fn logged<T>(diagnostics: &Diagnostics, operation: &str, result: Result<T>) -> Result<T> {
    if let Err(error) = &result {
        if error.is_structural() {
            diagnostics.structural(operation, error);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::ArrayItem;

    #[test]
    fn check_areas_reports_count_and_key_mismatch() {
        let areas = vec![Area::skeleton("general", "General"), Area::skeleton("tls", "TLS")];
        assert!(check_areas("Cfg", &areas, &["general", "tls"]).is_ok());

        let error = check_areas("Cfg", &areas, &["general"]).unwrap_err();
        assert!(error.to_string().contains("expected 1 areas, found 2"));

        let error = check_areas("Cfg", &areas, &["general", "cors"]).unwrap_err();
        assert!(error.to_string().contains("area 1 should be 'cors', found 'tls'"));
    }

    #[test]
    fn positional_reads_check_variants() {
        let nodes = vec![InputNode::text("name", "Name", "edge"), InputNode::toggle("on", "On", true)];
        assert_eq!(read_text(&nodes, 0).unwrap(), "edge");
        assert!(read_bool(&nodes, 1).unwrap());
        assert!(read_bool(&nodes, 0).unwrap_err().is_structural());
        assert!(read_text(&nodes, 5).unwrap_err().is_structural());
    }

    #[test]
    fn parse_int_keeps_current_on_garbage() {
        let diagnostics = Diagnostics::detached();
        assert_eq!(parse_int("port", " 8443 ", 80, &diagnostics), 8443);
        assert_eq!(parse_int("port", "", 80, &diagnostics), 0);
        assert_eq!(parse_int("port", "eighty", 80, &diagnostics), 80);
    }

    #[test]
    fn headers_merge_duplicate_entries() {
        let entries = vec![
            HeaderEntry { name: "x".into(), values: vec![ArrayItem::new("1")], error: "valid".into() },
            HeaderEntry { name: "x".into(), values: vec![ArrayItem::new("2")], error: "valid".into() },
        ];
        assert_eq!(headers_from_entries(&entries)["x"], vec!["1", "2"]);
    }
}

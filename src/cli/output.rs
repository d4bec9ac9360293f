//! Shared output formatting utilities for CLI commands
//!
//! Provides consistent output formatting across all CLI commands with support
//! for JSON, YAML, TOML, and table formats.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::form::Area;
use crate::session::EditOutcome;
use crate::sync::ValidationReport;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Toml,
    Table,
}

impl OutputFormat {
    /// Parse output format from string
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            "toml" => Ok(OutputFormat::Toml),
            "table" => Ok(OutputFormat::Table),
            _ => anyhow::bail!(
                "Unsupported output format: '{}'. Use 'json', 'yaml', 'toml', or 'table'.",
                s
            ),
        }
    }
}

/// Print data in the specified OutputFormat
pub fn print_output_format<T: Serialize>(data: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(data),
        OutputFormat::Yaml => print_yaml(data),
        OutputFormat::Toml => print_toml(data),
        OutputFormat::Table => {
            anyhow::bail!("Table format requires custom implementation per data type")
        }
    }
}

/// Print data as JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Print data as YAML
pub fn print_yaml<T: Serialize>(data: &T) -> Result<()> {
    let yaml = serde_yaml::to_string(data).context("Failed to serialize to YAML")?;
    println!("{}", yaml);
    Ok(())
}

/// Print data as TOML. Top-level values must be tables.
pub fn print_toml<T: Serialize>(data: &T) -> Result<()> {
    let toml = toml::to_string_pretty(data).context("Failed to serialize to TOML")?;
    println!("{}", toml);
    Ok(())
}

/// Rendered areas
#[derive(Debug, Serialize)]
pub struct AreasOutput<'a> {
    pub config: &'a str,
    pub areas: &'a [Area],
}

pub fn print_areas(output: &AreasOutput<'_>, format: OutputFormat) -> Result<()> {
    if format != OutputFormat::Table {
        return print_output_format(output, format);
    }

    print_table_header(&[("Area", 22), ("Label", 24), ("Nodes", 6), ("Status", 10)]);
    for area in output.areas {
        println!(
            "{:<22} {:<24} {:<6} {:<10}",
            truncate(&area.key, 22),
            truncate(&area.label, 24),
            area.nodes.len(),
            area.error
        );
    }
    println!();
    Ok(())
}

pub fn print_report(report: &ValidationReport, format: OutputFormat) -> Result<()> {
    if format != OutputFormat::Table {
        #[derive(Serialize)]
        struct ReportOutput<'a> {
            findings: &'a ValidationReport,
        }
        return print_output_format(&ReportOutput { findings: report }, format);
    }

    if report.is_empty() {
        println!("No findings");
        return Ok(());
    }
    print_table_header(&[("Path", 56), ("Token", 20)]);
    for (path, token) in report.iter() {
        println!("{:<56} {:<20}", truncate(path, 56), token);
    }
    println!();
    Ok(())
}

pub fn print_outcome(outcome: &EditOutcome, format: OutputFormat) -> Result<()> {
    if format != OutputFormat::Table {
        return print_output_format(outcome, format);
    }

    println!("Checksum: {}", outcome.checksum);
    if !outcome.changed_keys.is_empty() {
        print_table_header(&[("Old key", 24), ("New key", 24)]);
        for (old, new) in &outcome.changed_keys {
            println!("{:<24} {:<24}", old, new);
        }
    }
    println!();
    Ok(())
}

/// Truncate string to maximum length with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a horizontal separator line
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// Print a table header
pub fn print_table_header(columns: &[(&str, usize)]) {
    println!();
    let mut header = String::new();
    for (name, width) in columns {
        header.push_str(&format!("{:<width$} ", name, width = width));
    }
    println!("{}", header.trim());

    let total_width: usize = columns.iter().map(|(_, w)| w + 1).sum();
    print_separator(total_width.saturating_sub(1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("YAML").unwrap(), OutputFormat::Yaml);
        assert_eq!(OutputFormat::parse("toml").unwrap(), OutputFormat::Toml);
        assert_eq!(OutputFormat::parse("table").unwrap(), OutputFormat::Table);
        assert!(OutputFormat::parse("xml").is_err());
    }

    #[test]
    fn test_outcome_prints_in_every_format() {
        let outcome = EditOutcome {
            changed_keys: BTreeMap::from([("router2".to_string(), "router0".to_string())]),
            checksum: "abc".to_string(),
        };
        for format in
            [OutputFormat::Json, OutputFormat::Yaml, OutputFormat::Toml, OutputFormat::Table]
        {
            assert!(print_outcome(&outcome, format).is_ok());
        }
    }

    #[test]
    fn test_report_table_handles_empty_report() {
        assert!(print_report(&ValidationReport::new(), OutputFormat::Table).is_ok());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("hello", 3), "...");
    }
}

//! Building blocks shared by the document validators

use std::sync::LazyLock;

use regex::Regex;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::domain::Headers;
use crate::sync::{ReportPath, ValidationReport};

pub const REQUIRED: &str = "required";
pub const UNKNOWN_OPTION: &str = "unknown_option";
pub const BAD_PATH: &str = "bad_path";
pub const INVALID_HEADER_NAME: &str = "invalid_header_name";

/// Header names: letters, digits and hyphens
pub static HEADER_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]*$").unwrap());

/// `listen_port` → `ListenPort`
pub fn pascal_case(field: &str) -> String {
    field
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Record derive-rule failures of `errors` below `at`, one token per field.
pub fn flatten_errors(errors: &ValidationErrors, at: &ReportPath, report: &mut ValidationReport) {
    for (field, kind) in errors.errors() {
        let path = at.field(&pascal_case(field));
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(first) = list.first() {
                    report.insert(path.as_str(), first.code.to_string());
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten_errors(inner, &path, report),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten_errors(inner, &path.index(*index), report);
                }
            }
        }
    }
}

/// Run the derive rules of `value` and record failures below `at`.
pub fn check<T: Validate>(value: &T, at: &ReportPath, report: &mut ValidationReport) {
    if let Err(errors) = value.validate() {
        flatten_errors(&errors, at, report);
    }
}

pub fn check_option(value: &str, options: &[&str], at: &ReportPath, report: &mut ValidationReport) {
    if !options.contains(&value) {
        report.insert(at.as_str(), UNKNOWN_OPTION);
    }
}

pub fn require(value: &str, at: &ReportPath, report: &mut ValidationReport) {
    if value.trim().is_empty() {
        report.insert(at.as_str(), REQUIRED);
    }
}

/// Every item must be one of `options`.
pub fn check_items(items: &[String], options: &[&str], at: &ReportPath, report: &mut ValidationReport) {
    for (index, item) in items.iter().enumerate() {
        check_option(item, options, &at.index(index), report);
    }
}

/// Header names must be well formed and values non-empty.
pub fn check_headers(headers: &Headers, at: &ReportPath, report: &mut ValidationReport) {
    for (name, values) in headers {
        let entry = at.key(name);
        if !HEADER_NAME_REGEX.is_match(name) {
            report.insert(entry.as_str(), INVALID_HEADER_NAME);
        }
        for (index, value) in values.iter().enumerate() {
            require(value, &entry.index(index), report);
        }
    }
}

/// Router paths start and end with a slash.
pub fn is_routable_path(path: &str) -> bool {
    path.starts_with('/') && path.ends_with('/')
}

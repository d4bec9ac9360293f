//! Editable field values
//!
//! [`FieldValue`] is the closed set of payloads a form node can carry. Every
//! consumer matches on it exhaustively; there is no downcasting anywhere in the
//! engine. Each variant owns its error token and the human tooltip rendered
//! next to it.

use serde::Serialize;

use crate::errors::{FormplaneError, Result};

use super::node::InputNode;
use super::processor::ProcessorFormValue;
use super::router::RouterFormValue;

/// Token rendered on nodes without findings.
pub const VALID: &str = "valid";
/// Rollup token for a section containing at least one finding.
pub const INVALID: &str = "invalid";
/// Token for a repeatable element that violates a uniqueness rule.
pub const REJECTED: &str = "rejected";

/// Options offered by boolean choice fields.
pub const BOOL_OPTIONS: [&str; 2] = ["false", "true"];

/// Variant tag of a [`FieldValue`], used where a caller expects a fixed kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Choice,
    ArrayOfStrings,
    Label,
    HeaderMap,
    RouterForm,
    ProcessorForm,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Choice => "choice",
            FieldKind::ArrayOfStrings => "array_of_strings",
            FieldKind::Label => "label",
            FieldKind::HeaderMap => "header_map",
            FieldKind::RouterForm => "router_form",
            FieldKind::ProcessorForm => "processor_form",
        };
        f.write_str(name)
    }
}

/// Free text input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextValue {
    pub value: String,
    pub placeholder: String,
    pub error: String,
    pub tooltip: String,
}

impl TextValue {
    pub fn new(value: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            placeholder: placeholder.into(),
            error: VALID.to_string(),
            tooltip: String::new(),
        }
    }
}

/// Single selection out of a fixed option list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceValue {
    pub value: String,
    pub allowed_options: Vec<String>,
    pub error: String,
    pub tooltip: String,
}

impl ChoiceValue {
    pub fn new<I, S>(value: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            value: value.into(),
            allowed_options: options.into_iter().map(Into::into).collect(),
            error: VALID.to_string(),
            tooltip: String::new(),
        }
    }

    /// Boolean toggle rendered as a `"false"`/`"true"` choice.
    pub fn boolean(value: bool) -> Self {
        Self::new(value.to_string(), BOOL_OPTIONS)
    }

    pub fn is_true(&self) -> bool {
        self.value == "true"
    }
}

/// One entry of an ordered string collection together with its finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrayItem {
    pub value: String,
    pub error: String,
}

impl ArrayItem {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), error: VALID.to_string() }
    }

    pub fn with_error(value: impl Into<String>, error: impl Into<String>) -> Self {
        Self { value: value.into(), error: error.into() }
    }
}

/// Ordered list of strings, always kept lexicographically sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StringArrayValue {
    pub items: Vec<ArrayItem>,
    pub error: String,
    pub tooltip: String,
}

impl StringArrayValue {
    pub fn new(items: Vec<ArrayItem>) -> Self {
        Self { items, error: VALID.to_string(), tooltip: String::new() }
    }

    pub fn values(&self) -> Vec<String> {
        self.items.iter().map(|item| item.value.clone()).collect()
    }
}

/// Read-only display text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelValue {
    pub text: String,
    pub error: String,
    pub tooltip: String,
}

impl LabelValue {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), error: VALID.to_string(), tooltip: String::new() }
    }
}

/// One header name with all of its values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderEntry {
    pub name: String,
    pub values: Vec<ArrayItem>,
    pub error: String,
}

/// Multi-valued header map, names and values kept sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderMapValue {
    pub entries: Vec<HeaderEntry>,
    pub error: String,
    pub tooltip: String,
}

impl HeaderMapValue {
    pub fn new(entries: Vec<HeaderEntry>) -> Self {
        Self { entries, error: VALID.to_string(), tooltip: String::new() }
    }

    /// Flatten back into `(name, values)` pairs in rendered order.
    pub fn pairs(&self) -> Vec<(String, Vec<String>)> {
        self.entries
            .iter()
            .map(|entry| {
                (entry.name.clone(), entry.values.iter().map(|v| v.value.clone()).collect())
            })
            .collect()
    }

    /// Replace the whole map from alternating `name, value` submissions.
    fn apply_pairs(&mut self, submitted: &[String]) -> Result<()> {
        if submitted.len() % 2 != 0 {
            return Err(FormplaneError::submission(format!(
                "header submission needs name/value pairs, got {} entries",
                submitted.len()
            )));
        }

        let mut merged: Vec<(String, Vec<String>)> = Vec::new();
        for pair in submitted.chunks_exact(2) {
            let (name, value) = (&pair[0], pair[1].trim());
            if name.is_empty() {
                continue;
            }
            match merged.iter_mut().find(|(existing, _)| existing == name) {
                Some((_, values)) => values.push(value.to_string()),
                None => merged.push((name.clone(), vec![value.to_string()])),
            }
        }

        merged.sort_by(|a, b| a.0.cmp(&b.0));
        self.entries = merged
            .into_iter()
            .map(|(name, mut values)| {
                values.sort();
                HeaderEntry {
                    name,
                    values: values.into_iter().map(ArrayItem::new).collect(),
                    error: VALID.to_string(),
                }
            })
            .collect();
        Ok(())
    }
}

/// Polymorphic payload of an [`InputNode`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldValue {
    Text(TextValue),
    Choice(ChoiceValue),
    ArrayOfStrings(StringArrayValue),
    Label(LabelValue),
    HeaderMap(HeaderMapValue),
    RouterForm(RouterFormValue),
    ProcessorForm(ProcessorFormValue),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Choice(_) => FieldKind::Choice,
            FieldValue::ArrayOfStrings(_) => FieldKind::ArrayOfStrings,
            FieldValue::Label(_) => FieldKind::Label,
            FieldValue::HeaderMap(_) => FieldKind::HeaderMap,
            FieldValue::RouterForm(_) => FieldKind::RouterForm,
            FieldValue::ProcessorForm(_) => FieldKind::ProcessorForm,
        }
    }

    pub fn current_error(&self) -> &str {
        match self {
            FieldValue::Text(v) => &v.error,
            FieldValue::Choice(v) => &v.error,
            FieldValue::ArrayOfStrings(v) => &v.error,
            FieldValue::Label(v) => &v.error,
            FieldValue::HeaderMap(v) => &v.error,
            FieldValue::RouterForm(v) => &v.error,
            FieldValue::ProcessorForm(v) => &v.error,
        }
    }

    pub fn current_error_tooltip(&self) -> &str {
        match self {
            FieldValue::Text(v) => &v.tooltip,
            FieldValue::Choice(v) => &v.tooltip,
            FieldValue::ArrayOfStrings(v) => &v.tooltip,
            FieldValue::Label(v) => &v.tooltip,
            FieldValue::HeaderMap(v) => &v.tooltip,
            FieldValue::RouterForm(v) => &v.tooltip,
            FieldValue::ProcessorForm(v) => &v.tooltip,
        }
    }

    /// Record a finding and its explanation on this value.
    pub fn set_error(&mut self, error: impl Into<String>, tooltip: impl Into<String>) {
        let (slot, tip) = match self {
            FieldValue::Text(v) => (&mut v.error, &mut v.tooltip),
            FieldValue::Choice(v) => (&mut v.error, &mut v.tooltip),
            FieldValue::ArrayOfStrings(v) => (&mut v.error, &mut v.tooltip),
            FieldValue::Label(v) => (&mut v.error, &mut v.tooltip),
            FieldValue::HeaderMap(v) => (&mut v.error, &mut v.tooltip),
            FieldValue::RouterForm(v) => (&mut v.error, &mut v.tooltip),
            FieldValue::ProcessorForm(v) => (&mut v.error, &mut v.tooltip),
        };
        *slot = error.into();
        *tip = tooltip.into();
    }

    /// Apply an operator submission.
    ///
    /// An empty submission means the field was not part of the posted form and
    /// leaves the value untouched.
    pub fn set_value(&mut self, submitted: &[String]) -> Result<()> {
        if submitted.is_empty() {
            return Ok(());
        }

        match self {
            FieldValue::Text(v) => {
                v.value = submitted[0].clone();
            }
            FieldValue::Choice(v) => {
                let proposed = &submitted[0];
                if v.allowed_options.iter().any(|option| option == proposed) {
                    v.value = proposed.clone();
                }
            }
            FieldValue::ArrayOfStrings(v) => {
                let mut values: Vec<String> =
                    submitted.iter().filter(|s| !s.is_empty()).cloned().collect();
                values.sort();
                v.items = values.into_iter().map(ArrayItem::new).collect();
            }
            FieldValue::Label(_) => {}
            FieldValue::HeaderMap(v) => v.apply_pairs(submitted)?,
            FieldValue::RouterForm(_) | FieldValue::ProcessorForm(_) => {
                return Err(FormplaneError::structural(
                    self.kind().to_string(),
                    "composite forms are set through their slots",
                ));
            }
        }
        Ok(())
    }

    /// Independent deep copy. A copied router gets `copy/` appended to its path
    /// so the clone cannot silently shadow the original route.
    pub fn duplicate(&self) -> FieldValue {
        let mut copy = self.clone();
        if let FieldValue::RouterForm(router) = &mut copy {
            router.mark_as_copy();
        }
        copy
    }

    /// Fresh value of the same variant with default contents.
    ///
    /// Labels keep their text and choices keep their options: both are
    /// display metadata rather than operator input.
    pub fn blank(&self) -> FieldValue {
        match self {
            FieldValue::Text(v) => FieldValue::Text(TextValue::new("", v.placeholder.clone())),
            FieldValue::Choice(v) => {
                let first = v.allowed_options.first().cloned().unwrap_or_default();
                FieldValue::Choice(ChoiceValue::new(first, v.allowed_options.clone()))
            }
            FieldValue::ArrayOfStrings(_) => {
                FieldValue::ArrayOfStrings(StringArrayValue::new(Vec::new()))
            }
            FieldValue::Label(v) => FieldValue::Label(LabelValue::new(v.text.clone())),
            FieldValue::HeaderMap(_) => FieldValue::HeaderMap(HeaderMapValue::new(Vec::new())),
            FieldValue::RouterForm(_) => FieldValue::RouterForm(RouterFormValue::blank()),
            FieldValue::ProcessorForm(_) => FieldValue::ProcessorForm(ProcessorFormValue::blank()),
        }
    }

    /// Child nodes of composite variants; empty for leaves.
    pub fn children(&self) -> &[InputNode] {
        match self {
            FieldValue::RouterForm(v) => &v.children,
            FieldValue::ProcessorForm(v) => &v.children,
            _ => &[],
        }
    }
}

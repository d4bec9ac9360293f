//! Tree nodes of the editable form

use serde::Serialize;

use crate::errors::{FormplaneError, Result};

use super::value::{
    ArrayItem, ChoiceValue, FieldKind, FieldValue, HeaderEntry, HeaderMapValue, LabelValue,
    StringArrayValue, TextValue,
};

/// One node of the editable tree.
///
/// `key` identifies the node among its siblings. It is assigned by whoever
/// builds the node and only survives structural edits when the edit carries
/// it forward explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputNode {
    pub key: String,
    pub label: String,
    pub tooltip: String,
    pub value: FieldValue,
}

impl InputNode {
    pub fn new(key: impl Into<String>, label: impl Into<String>, value: FieldValue) -> Self {
        Self { key: key.into(), label: label.into(), tooltip: String::new(), value }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = tooltip.into();
        self
    }

    pub fn text(key: &str, label: &str, value: impl Into<String>) -> Self {
        Self::new(key, label, FieldValue::Text(TextValue::new(value, label)))
    }

    pub fn choice(key: &str, label: &str, value: impl Into<String>, options: &[&str]) -> Self {
        Self::new(key, label, FieldValue::Choice(ChoiceValue::new(value, options.iter().copied())))
    }

    pub fn toggle(key: &str, label: &str, value: bool) -> Self {
        Self::new(key, label, FieldValue::Choice(ChoiceValue::boolean(value)))
    }

    pub fn label_node(key: &str, text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(key, text.clone(), FieldValue::Label(LabelValue::new(text)))
    }

    pub fn strings(key: &str, label: &str, items: Vec<ArrayItem>) -> Self {
        Self::new(key, label, FieldValue::ArrayOfStrings(StringArrayValue::new(items)))
    }

    pub fn headers(key: &str, label: &str, entries: Vec<HeaderEntry>) -> Self {
        Self::new(key, label, FieldValue::HeaderMap(HeaderMapValue::new(entries)))
    }

    pub fn kind(&self) -> FieldKind {
        self.value.kind()
    }

    pub fn children(&self) -> &[InputNode] {
        self.value.children()
    }

    /// Deep copy under a new key.
    pub fn duplicate(&self, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: self.label.clone(),
            tooltip: self.tooltip.clone(),
            value: self.value.duplicate(),
        }
    }

    /// Fail with a structural error unless this node carries `expected`.
    pub fn expect_kind(&self, expected: FieldKind) -> Result<()> {
        if self.kind() == expected {
            Ok(())
        } else {
            Err(FormplaneError::structural(
                format!("node '{}'", self.key),
                format!("expected {}, found {}", expected, self.kind()),
            ))
        }
    }

    pub fn as_text(&self) -> Result<&TextValue> {
        match &self.value {
            FieldValue::Text(v) => Ok(v),
            other => Err(self.mismatch(FieldKind::Text, other.kind())),
        }
    }

    pub fn as_choice(&self) -> Result<&ChoiceValue> {
        match &self.value {
            FieldValue::Choice(v) => Ok(v),
            other => Err(self.mismatch(FieldKind::Choice, other.kind())),
        }
    }

    pub fn as_strings(&self) -> Result<&StringArrayValue> {
        match &self.value {
            FieldValue::ArrayOfStrings(v) => Ok(v),
            other => Err(self.mismatch(FieldKind::ArrayOfStrings, other.kind())),
        }
    }

    pub fn as_headers(&self) -> Result<&HeaderMapValue> {
        match &self.value {
            FieldValue::HeaderMap(v) => Ok(v),
            other => Err(self.mismatch(FieldKind::HeaderMap, other.kind())),
        }
    }

    pub fn as_label(&self) -> Result<&LabelValue> {
        match &self.value {
            FieldValue::Label(v) => Ok(v),
            other => Err(self.mismatch(FieldKind::Label, other.kind())),
        }
    }

    fn mismatch(&self, expected: FieldKind, found: FieldKind) -> FormplaneError {
        FormplaneError::structural(
            format!("node '{}'", self.key),
            format!("expected {}, found {}", expected, found),
        )
    }
}

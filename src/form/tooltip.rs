//! Human explanations for validation tokens

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value::VALID;

const DEFAULT_FALLBACK: &str = "This value was rejected by the validator.";

/// Token → explanation lookup with a fallback for unknown tokens.
///
/// The table is data: deployments can override it from settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipTable {
    pub entries: BTreeMap<String, String>,
    pub fallback: String,
}

impl Default for TooltipTable {
    fn default() -> Self {
        let entries = [
            ("invalid", "One or more fields in this section need attention."),
            ("rejected", "Another router already serves this path; change it before deploying."),
            ("required", "This field must not be empty."),
            ("not_unique", "This value must be unique."),
            ("out_of_range", "The number is outside the accepted range."),
            ("malformed_url", "Enter an absolute URL such as http://backend:8080."),
            ("bad_path", "Paths must start and end with '/'."),
            ("invalid_header_name", "Header names may only contain letters, digits and '-'."),
            ("unknown_option", "Pick one of the offered options."),
            ("unreachable", "The destination did not answer during validation."),
        ]
        .into_iter()
        .map(|(token, text)| (token.to_string(), text.to_string()))
        .collect();

        Self { entries, fallback: DEFAULT_FALLBACK.to_string() }
    }
}

impl TooltipTable {
    /// Explanation for `token`; the `valid` token never carries one.
    pub fn lookup(&self, token: &str) -> String {
        if token == VALID {
            return String::new();
        }
        self.entries.get(token).cloned().unwrap_or_else(|| self.fallback.clone())
    }

    /// Overlay entries from another table, keeping anything it does not mention.
    pub fn merged_with(mut self, overrides: &TooltipTable) -> Self {
        for (token, text) in &overrides.entries {
            self.entries.insert(token.clone(), text.clone());
        }
        if !overrides.fallback.is_empty() {
            self.fallback = overrides.fallback.clone();
        }
        self
    }
}

//! Configuration sections rendered as one form each

use serde::Serialize;

use super::node::InputNode;
use super::tooltip::TooltipTable;
use super::value::VALID;

/// One configuration section: its nodes plus the rolled-up finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub key: String,
    pub label: String,
    /// Page the UI returns to after submitting this section's form.
    pub redirect_target: String,
    pub form_id: String,
    pub nodes: Vec<InputNode>,
    pub error: String,
    pub tooltip: String,
}

impl Area {
    /// Empty skeleton; nodes are filled in by the sync engine.
    pub fn skeleton(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            redirect_target: format!("/edit/{}", key),
            form_id: format!("form-{}", key.replace('_', "-")),
            nodes: Vec::new(),
            error: VALID.to_string(),
            tooltip: String::new(),
        }
    }

    pub fn set_error(&mut self, token: impl Into<String>, tooltips: &TooltipTable) {
        let token = token.into();
        self.tooltip = tooltips.lookup(&token);
        self.error = token;
    }

    pub fn is_valid(&self) -> bool {
        self.error == VALID
    }
}

//! Processor sub-form
//!
//! Nine fixed slots describing one processing step of a stage.

use serde::Serialize;

use crate::errors::{FormplaneError, Result};

use super::node::InputNode;
use super::value::{ArrayItem, ChoiceValue, StringArrayValue, TextValue, VALID};

pub const NAME_SLOT: usize = 0;
pub const MODIFIER_SLOT: usize = 1;
pub const REQUIRED_SLOT: usize = 2;
pub const ASYNC_SLOT: usize = 3;
pub const INPUT_INCLUDE_SLOT: usize = 4;
pub const INPUT_EXCLUDE_SLOT: usize = 5;
pub const OUTPUT_WRITE_SLOT: usize = 6;
pub const TOPIC_SLOT: usize = 7;
pub const TIMEOUT_SLOT: usize = 8;
pub const PROCESSOR_SLOTS: usize = 9;

/// Plain values of one processor alternative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessorFields {
    pub name: String,
    pub modifier: bool,
    pub required: bool,
    pub is_async: bool,
    pub input_include: Vec<ArrayItem>,
    pub input_exclude: Vec<ArrayItem>,
    pub output_write: Vec<ArrayItem>,
    pub topic: String,
    /// Raw text of the timeout field; parsed by the sync engine.
    pub timeout: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessorFormValue {
    pub children: Vec<InputNode>,
    pub error: String,
    pub tooltip: String,
}

impl ProcessorFormValue {
    pub fn new(fields: ProcessorFields) -> Self {
        let children = vec![
            InputNode::text("name", "Name", fields.name),
            InputNode::toggle("modifier", "Modifies payload", fields.modifier),
            InputNode::toggle("required", "Required", fields.required),
            InputNode::toggle("async", "Asynchronous", fields.is_async),
            InputNode::strings("input_include", "Include fields", fields.input_include),
            InputNode::strings("input_exclude", "Exclude fields", fields.input_exclude),
            InputNode::strings("output_write", "Write fields", fields.output_write),
            InputNode::text("topic", "Topic", fields.topic),
            InputNode::text("timeout", "Timeout (ms)", fields.timeout),
        ];
        Self { children, error: VALID.to_string(), tooltip: String::new() }
    }

    pub fn blank() -> Self {
        Self::new(ProcessorFields { timeout: "0".to_string(), ..ProcessorFields::default() })
    }

    fn slot(&self, index: usize) -> Result<&InputNode> {
        if self.children.len() != PROCESSOR_SLOTS {
            return Err(FormplaneError::structural(
                "processor form",
                format!("expected {} slots, found {}", PROCESSOR_SLOTS, self.children.len()),
            ));
        }
        Ok(&self.children[index])
    }

    pub fn slot_mut(&mut self, index: usize) -> Result<&mut InputNode> {
        if self.children.len() != PROCESSOR_SLOTS || index >= PROCESSOR_SLOTS {
            return Err(FormplaneError::structural(
                "processor form",
                format!(
                    "slot {} out of {} (form has {})",
                    index,
                    PROCESSOR_SLOTS,
                    self.children.len()
                ),
            ));
        }
        Ok(&mut self.children[index])
    }

    pub fn name(&self) -> Result<&TextValue> {
        self.slot(NAME_SLOT)?.as_text()
    }

    pub fn modifier(&self) -> Result<&ChoiceValue> {
        self.slot(MODIFIER_SLOT)?.as_choice()
    }

    pub fn required(&self) -> Result<&ChoiceValue> {
        self.slot(REQUIRED_SLOT)?.as_choice()
    }

    pub fn is_async(&self) -> Result<&ChoiceValue> {
        self.slot(ASYNC_SLOT)?.as_choice()
    }

    pub fn input_include(&self) -> Result<&StringArrayValue> {
        self.slot(INPUT_INCLUDE_SLOT)?.as_strings()
    }

    pub fn input_exclude(&self) -> Result<&StringArrayValue> {
        self.slot(INPUT_EXCLUDE_SLOT)?.as_strings()
    }

    pub fn output_write(&self) -> Result<&StringArrayValue> {
        self.slot(OUTPUT_WRITE_SLOT)?.as_strings()
    }

    pub fn topic(&self) -> Result<&TextValue> {
        self.slot(TOPIC_SLOT)?.as_text()
    }

    pub fn timeout(&self) -> Result<&TextValue> {
        self.slot(TIMEOUT_SLOT)?.as_text()
    }

    pub fn fields(&self) -> Result<ProcessorFields> {
        Ok(ProcessorFields {
            name: self.name()?.value.clone(),
            modifier: self.modifier()?.is_true(),
            required: self.required()?.is_true(),
            is_async: self.is_async()?.is_true(),
            input_include: self.input_include()?.items.clone(),
            input_exclude: self.input_exclude()?.items.clone(),
            output_write: self.output_write()?.items.clone(),
            topic: self.topic()?.value.clone(),
            timeout: self.timeout()?.value.clone(),
        })
    }
}

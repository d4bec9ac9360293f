//! Edits on a processor matrix laid out as stage labels followed by alternatives

use crate::errors::{FormplaneError, Result};
use crate::form::{FieldKind, FieldValue, InputNode};
use crate::observability::Diagnostics;
use crate::sync::gateway::{processor_key, stage_key};
use crate::sync::RepeatableKind;

use super::{position, unique_key};

fn is_stage_label(node: &InputNode) -> bool {
    matches!(node.value, FieldValue::Label(_))
}

/// Half-open node range `[start, end)` of the stage holding `index`, label included.
fn stage_bounds(nodes: &[InputNode], index: usize) -> (usize, usize) {
    let start = nodes[..=index].iter().rposition(is_stage_label).unwrap_or(0);
    let end = nodes[index + 1..]
        .iter()
        .position(is_stage_label)
        .map_or(nodes.len(), |offset| index + 1 + offset);
    (start, end)
}

fn stage_count(nodes: &[InputNode]) -> usize {
    nodes.iter().filter(|node| is_stage_label(node)).count()
}

fn new_stage_label(nodes: &[InputNode]) -> InputNode {
    let key = unique_key(nodes, &stage_key(stage_count(nodes)));
    InputNode::label_node(&key, "New stage")
}

fn new_alternative(nodes: &[InputNode], stage: usize, alternative: usize) -> InputNode {
    let key = unique_key(nodes, &processor_key(stage, alternative));
    RepeatableKind::ProcessorMatrix.blank_node(&key)
}

/// Open a new last stage holding one blank alternative. Returns its key.
pub fn append_stage(nodes: &mut Vec<InputNode>, diagnostics: &Diagnostics) -> String {
    let span = diagnostics.edit("append_stage", "");
    let _guard = span.enter();

    let stage = stage_count(nodes);
    let label = new_stage_label(nodes);
    nodes.push(label);
    let processor = new_alternative(nodes, stage, 0);
    let key = processor.key.clone();
    nodes.push(processor);
    tracing::debug!(stage, key = %key, "appended stage");
    key
}

/// Add a blank alternative next to the processor carrying `key`, within its stage.
pub fn insert_alternative(
    nodes: &mut Vec<InputNode>,
    key: &str,
    before: bool,
    diagnostics: &Diagnostics,
) -> Result<String> {
    let span = diagnostics.edit("insert_alternative", key);
    let _guard = span.enter();

    let index = position(nodes, key)?;
    nodes[index].expect_kind(FieldKind::ProcessorForm)?;
    let (start, end) = stage_bounds(nodes, index);
    let stage = nodes[..start].iter().filter(|node| is_stage_label(node)).count();
    let alternatives = nodes[start..end].iter().filter(|node| !is_stage_label(node)).count();
    let processor = new_alternative(nodes, stage, alternatives);
    let new_key = processor.key.clone();
    nodes.insert(if before { index } else { index + 1 }, processor);
    Ok(new_key)
}

/// Open a new stage before or after the stage holding `key`. Returns the key
/// of the new stage's alternative.
pub fn insert_stage(
    nodes: &mut Vec<InputNode>,
    key: &str,
    before: bool,
    diagnostics: &Diagnostics,
) -> Result<String> {
    let span = diagnostics.edit("insert_stage", key);
    let _guard = span.enter();

    let index = position(nodes, key)?;
    let (start, end) = stage_bounds(nodes, index);
    let at = if before { start } else { end };
    let stage = nodes[..at].iter().filter(|node| is_stage_label(node)).count();

    let label = new_stage_label(nodes);
    let processor = new_alternative(nodes, stage, 0);
    let new_key = processor.key.clone();
    nodes.splice(at..at, [label, processor]);
    Ok(new_key)
}

/// Remove the alternative carrying `key`; a stage left without alternatives
/// disappears together with its label.
pub fn delete_alternative(
    nodes: &mut Vec<InputNode>,
    key: &str,
    diagnostics: &Diagnostics,
) -> Result<()> {
    let span = diagnostics.edit("delete_alternative", key);
    let _guard = span.enter();

    let index = position(nodes, key)?;
    if nodes[index].kind() != FieldKind::ProcessorForm {
        return Err(FormplaneError::structural(
            format!("node '{}'", key),
            format!("only processors can be deleted, found {}", nodes[index].kind()),
        ));
    }
    let (start, end) = stage_bounds(nodes, index);
    let alternatives = nodes[start..end].iter().filter(|node| !is_stage_label(node)).count();

    if alternatives == 1 {
        nodes.drain(start..end);
        tracing::debug!(start, "removed emptied stage");
    } else {
        nodes.remove(index);
    }
    Ok(())
}

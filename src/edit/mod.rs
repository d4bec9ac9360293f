//! # Tree Edits
//!
//! Stateless structural edits on one area's node list. Repeatable elements are
//! addressed by identity key; every lookup goes through [`find_by_key`].
//!
//! An edited list is never authoritative on its own: the caller must push it
//! back through the sync engine and renormalize before anything is persisted.

pub mod processors;

use crate::errors::{FormplaneError, Result};
use crate::form::{FieldKind, FieldValue, InputNode};
use crate::observability::Diagnostics;

/// Suffix of the key a duplicated node receives.
pub const COPY_KEY_SUFFIX: &str = "_copy";

/// First node carrying `key`.
pub fn find_by_key<'a>(nodes: &'a [InputNode], key: &str) -> Result<&'a InputNode> {
    nodes
        .iter()
        .find(|node| node.key == key)
        .ok_or_else(|| FormplaneError::not_found("node list", key))
}

pub fn find_by_key_mut<'a>(nodes: &'a mut [InputNode], key: &str) -> Result<&'a mut InputNode> {
    nodes
        .iter_mut()
        .find(|node| node.key == key)
        .ok_or_else(|| FormplaneError::not_found("node list", key))
}

/// Index of the first node carrying `key`.
pub fn position(nodes: &[InputNode], key: &str) -> Result<usize> {
    nodes
        .iter()
        .position(|node| node.key == key)
        .ok_or_else(|| FormplaneError::not_found("node list", key))
}

/// `candidate`, suffixed with `_new` until no sibling carries it.
///
/// The suffix only applies when `candidate` is already taken, e.g. a second
/// copy of `k0` becomes `k0_copy_new` because `k0_copy` exists.
pub fn unique_key(nodes: &[InputNode], candidate: &str) -> String {
    let mut key = candidate.to_string();
    while nodes.iter().any(|node| node.key == key) {
        key.push_str("_new");
    }
    key
}

/// Add `node` at the end of the list.
pub fn append(nodes: &mut Vec<InputNode>, node: InputNode, diagnostics: &Diagnostics) {
    let span = diagnostics.edit("append", &node.key);
    let _guard = span.enter();
    nodes.push(node);
    tracing::debug!(len = nodes.len(), "appended node");
}

/// Insert `node` next to the node carrying `key`, before it when `before` is set.
pub fn insert(
    nodes: &mut Vec<InputNode>,
    key: &str,
    node: InputNode,
    before: bool,
    diagnostics: &Diagnostics,
) -> Result<()> {
    let span = diagnostics.edit("insert", key);
    let _guard = span.enter();
    let index = position(nodes, key)?;
    let at = if before { index } else { index + 1 };
    tracing::debug!(at, new_key = %node.key, "inserting node");
    nodes.insert(at, node);
    Ok(())
}

/// Deep-copy the node carrying `key` and place the copy immediately before it.
///
/// The copy is keyed `key + "_copy"`. Returns the copy's key.
pub fn duplicate(
    nodes: &mut Vec<InputNode>,
    key: &str,
    expected: FieldKind,
    diagnostics: &Diagnostics,
) -> Result<String> {
    let span = diagnostics.edit("duplicate", key);
    let _guard = span.enter();

    let index = position(nodes, key)?;
    let original = &nodes[index];
    original.expect_kind(expected)?;

    let copy_key = unique_key(nodes, &format!("{}{}", key, COPY_KEY_SUFFIX));
    let copy = original.duplicate(copy_key.clone());
    nodes.insert(index, copy);
    tracing::debug!(copy_key = %copy_key, "duplicated node");
    Ok(copy_key)
}

/// Remove and return the node carrying `key`.
pub fn delete(nodes: &mut Vec<InputNode>, key: &str, diagnostics: &Diagnostics) -> Result<InputNode> {
    let span = diagnostics.edit("delete", key);
    let _guard = span.enter();
    let index = position(nodes, key)?;
    Ok(nodes.remove(index))
}

/// Apply a submission to the node carrying `key`, or to one slot of it when
/// the node is a composite form.
pub fn set_values(
    nodes: &mut [InputNode],
    key: &str,
    slot: Option<usize>,
    values: &[String],
    diagnostics: &Diagnostics,
) -> Result<()> {
    let span = diagnostics.edit("set_values", key);
    let _guard = span.enter();

    let node = find_by_key_mut(nodes, key)?;
    let field = match slot {
        None => node,
        Some(index) => composite_slot(node, index)?,
    };
    field.value.set_value(values).map_err(|error| match error {
        FormplaneError::Submission { message, .. } => {
            FormplaneError::submission_field(message, field.key.clone())
        }
        other => other,
    })
}

fn composite_slot(node: &mut InputNode, index: usize) -> Result<&mut InputNode> {
    let key = node.key.clone();
    match &mut node.value {
        FieldValue::RouterForm(form) => form.slot_mut(index),
        FieldValue::ProcessorForm(form) => form.slot_mut(index),
        other => Err(FormplaneError::structural(
            format!("node '{}'", key),
            format!("{} has no slots", other.kind()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::router::{OUTBOUND_URL_SLOT, PATH_SLOT};
    use crate::form::{RouterFields, RouterFormValue};

    fn router(key: &str, path: &str) -> InputNode {
        InputNode::new(
            key,
            "Router",
            FieldValue::RouterForm(RouterFormValue::new(RouterFields {
                path: path.to_string(),
                ..RouterFields::default()
            })),
        )
    }

    fn keys(nodes: &[InputNode]) -> Vec<&str> {
        nodes.iter().map(|node| node.key.as_str()).collect()
    }

    fn path_of(node: &InputNode) -> String {
        let FieldValue::RouterForm(form) = &node.value else { panic!("expected router") };
        form.path().unwrap().value.clone()
    }

    #[test]
    fn duplicate_places_copy_before_original() {
        let diagnostics = Diagnostics::detached();
        let mut nodes = vec![InputNode::label_node("url0", "http://u0"), router("k0", "/orders/")];

        let copy_key = duplicate(&mut nodes, "k0", FieldKind::RouterForm, &diagnostics).unwrap();

        assert_eq!(copy_key, "k0_copy");
        assert_eq!(keys(&nodes), vec!["url0", "k0_copy", "k0"]);
        assert_eq!(nodes.iter().filter(|n| n.key == "k0").count(), 1);
        assert_eq!(path_of(&nodes[1]), "/orders/copy/");
        assert_eq!(path_of(&nodes[2]), "/orders/");
    }

    #[test]
    fn duplicate_rejects_wrong_variant_and_missing_key() {
        let diagnostics = Diagnostics::detached();
        let mut nodes = vec![InputNode::label_node("url0", "http://u0")];

        let error = duplicate(&mut nodes, "url0", FieldKind::RouterForm, &diagnostics).unwrap_err();
        assert!(error.is_structural());
        let error = duplicate(&mut nodes, "k9", FieldKind::RouterForm, &diagnostics).unwrap_err();
        assert!(matches!(error, FormplaneError::NotFound { .. }));
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn second_duplicate_gets_fresh_key() {
        let diagnostics = Diagnostics::detached();
        let mut nodes = vec![router("k0", "/a/")];
        duplicate(&mut nodes, "k0", FieldKind::RouterForm, &diagnostics).unwrap();
        let second = duplicate(&mut nodes, "k0", FieldKind::RouterForm, &diagnostics).unwrap();
        assert_eq!(second, "k0_copy_new");
    }

    #[test]
    fn insert_honours_before_flag() {
        let diagnostics = Diagnostics::detached();
        let mut nodes = vec![router("a", "/a/"), router("b", "/b/")];
        insert(&mut nodes, "b", router("x", ""), true, &diagnostics).unwrap();
        insert(&mut nodes, "b", router("y", ""), false, &diagnostics).unwrap();
        append(&mut nodes, router("z", ""), &diagnostics);
        assert_eq!(keys(&nodes), vec!["a", "x", "b", "y", "z"]);
    }

    #[test]
    fn delete_removes_first_match() {
        let diagnostics = Diagnostics::detached();
        let mut nodes = vec![router("a", "/a/"), router("b", "/b/")];
        let removed = delete(&mut nodes, "a", &diagnostics).unwrap();
        assert_eq!(path_of(&removed), "/a/");
        assert_eq!(keys(&nodes), vec!["b"]);
        assert!(delete(&mut nodes, "a", &diagnostics).is_err());
    }

    #[test]
    fn set_values_addresses_composite_slots() {
        let diagnostics = Diagnostics::detached();
        let mut nodes = vec![router("k0", "/a/"), InputNode::text("name", "Name", "")];

        set_values(&mut nodes, "k0", Some(PATH_SLOT), &["/b/".to_string()], &diagnostics).unwrap();
        set_values(&mut nodes, "k0", Some(OUTBOUND_URL_SLOT), &[], &diagnostics).unwrap();
        set_values(&mut nodes, "name", None, &["edge".to_string()], &diagnostics).unwrap();

        assert_eq!(path_of(&nodes[0]), "/b/");
        assert_eq!(nodes[1].as_text().unwrap().value, "edge");
        assert!(set_values(&mut nodes, "name", Some(0), &[], &diagnostics)
            .unwrap_err()
            .is_structural());
    }

    #[test]
    fn header_submission_errors_name_the_field() {
        let diagnostics = Diagnostics::detached();
        let mut nodes = vec![InputNode::headers("request", "Request headers", Vec::new())];
        let error =
            set_values(&mut nodes, "request", None, &["x-only".to_string()], &diagnostics)
                .unwrap_err();
        assert!(matches!(
            error,
            FormplaneError::Submission { field: Some(ref field), .. } if field == "request"
        ));
    }
}

//! Router sub-form
//!
//! A router form always holds exactly seven children in a fixed order. The
//! slot numbers live here and nowhere else; callers go through the named
//! accessors.

use serde::Serialize;

use crate::errors::{FormplaneError, Result};

use super::node::InputNode;
use super::value::{FieldValue, HeaderEntry, HeaderMapValue, TextValue, VALID};

pub const PATH_SLOT: usize = 0;
pub const INGRESS_LABEL_SLOT: usize = 1;
pub const INGRESS_HEADERS_SLOT: usize = 2;
pub const OUTBOUND_LABEL_SLOT: usize = 3;
pub const OUTBOUND_URL_SLOT: usize = 4;
pub const OUTBOUND_ENDPOINT_SLOT: usize = 5;
pub const OUTBOUND_HEADERS_SLOT: usize = 6;
pub const ROUTER_SLOTS: usize = 7;

/// Suffix appended to the path of a duplicated router.
pub const COPY_PATH_SUFFIX: &str = "copy/";

/// Plain values of one router, as read from or written to a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterFields {
    pub path: String,
    pub ingress_headers: Vec<HeaderEntry>,
    pub outbound_url: String,
    pub outbound_endpoint: String,
    pub outbound_headers: Vec<HeaderEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouterFormValue {
    pub children: Vec<InputNode>,
    pub error: String,
    pub tooltip: String,
}

impl RouterFormValue {
    pub fn new(fields: RouterFields) -> Self {
        let children = vec![
            InputNode::text("path", "Path", fields.path),
            InputNode::label_node("ingress_label", "Ingress"),
            InputNode::headers("ingress_headers", "Ingress headers", fields.ingress_headers),
            InputNode::label_node("outbound_label", "Outbound"),
            InputNode::text("outbound_url", "Outbound URL", fields.outbound_url),
            InputNode::text("outbound_endpoint", "Outbound endpoint", fields.outbound_endpoint),
            InputNode::headers("outbound_headers", "Outbound headers", fields.outbound_headers),
        ];
        Self { children, error: VALID.to_string(), tooltip: String::new() }
    }

    pub fn blank() -> Self {
        Self::new(RouterFields::default())
    }

    pub(crate) fn mark_as_copy(&mut self) {
        if let Some(InputNode { value: FieldValue::Text(path), .. }) =
            self.children.get_mut(PATH_SLOT)
        {
            path.value.push_str(COPY_PATH_SUFFIX);
        }
    }

    fn slot(&self, index: usize) -> Result<&InputNode> {
        if self.children.len() != ROUTER_SLOTS {
            return Err(FormplaneError::structural(
                "router form",
                format!("expected {} slots, found {}", ROUTER_SLOTS, self.children.len()),
            ));
        }
        Ok(&self.children[index])
    }

    /// Mutable access to a slot, used when applying submissions or findings.
    pub fn slot_mut(&mut self, index: usize) -> Result<&mut InputNode> {
        if self.children.len() != ROUTER_SLOTS || index >= ROUTER_SLOTS {
            return Err(FormplaneError::structural(
                "router form",
                format!("slot {} out of {} (form has {})", index, ROUTER_SLOTS, self.children.len()),
            ));
        }
        Ok(&mut self.children[index])
    }

    pub fn path(&self) -> Result<&TextValue> {
        self.slot(PATH_SLOT)?.as_text()
    }

    pub fn ingress_headers(&self) -> Result<&HeaderMapValue> {
        self.slot(INGRESS_HEADERS_SLOT)?.as_headers()
    }

    pub fn outbound_url(&self) -> Result<&TextValue> {
        self.slot(OUTBOUND_URL_SLOT)?.as_text()
    }

    pub fn outbound_endpoint(&self) -> Result<&TextValue> {
        self.slot(OUTBOUND_ENDPOINT_SLOT)?.as_text()
    }

    pub fn outbound_headers(&self) -> Result<&HeaderMapValue> {
        self.slot(OUTBOUND_HEADERS_SLOT)?.as_headers()
    }

    /// Read every slot, checking the fixed shape on the way.
    pub fn fields(&self) -> Result<RouterFields> {
        self.slot(INGRESS_LABEL_SLOT)?.as_label()?;
        self.slot(OUTBOUND_LABEL_SLOT)?.as_label()?;
        Ok(RouterFields {
            path: self.path()?.value.clone(),
            ingress_headers: self.ingress_headers()?.entries.clone(),
            outbound_url: self.outbound_url()?.value.clone(),
            outbound_endpoint: self.outbound_endpoint()?.value.clone(),
            outbound_headers: self.outbound_headers()?.entries.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::value::ArrayItem;

    fn sample() -> RouterFormValue {
        RouterFormValue::new(RouterFields {
            path: "/orders/".to_string(),
            ingress_headers: vec![HeaderEntry {
                name: "x-tenant".to_string(),
                values: vec![ArrayItem::new("acme")],
                error: VALID.to_string(),
            }],
            outbound_url: "http://orders:8080".to_string(),
            outbound_endpoint: "/v1/orders".to_string(),
            outbound_headers: Vec::new(),
        })
    }

    #[test]
    fn accessors_follow_slot_layout() {
        let router = sample();
        assert_eq!(router.children.len(), ROUTER_SLOTS);
        assert_eq!(router.path().unwrap().value, "/orders/");
        assert_eq!(router.outbound_url().unwrap().value, "http://orders:8080");
        assert_eq!(router.outbound_endpoint().unwrap().value, "/v1/orders");
        assert_eq!(router.ingress_headers().unwrap().entries[0].name, "x-tenant");
        assert!(router.outbound_headers().unwrap().entries.is_empty());
    }

    #[test]
    fn duplicate_appends_copy_suffix_to_path() {
        let original = FieldValue::RouterForm(sample());
        let FieldValue::RouterForm(copy) = original.duplicate() else { panic!("expected router") };
        assert_eq!(copy.path().unwrap().value, "/orders/copy/");
        let FieldValue::RouterForm(original) = original else { panic!("expected router") };
        assert_eq!(original.path().unwrap().value, "/orders/");
    }

    #[test]
    fn duplicate_is_independent_of_original() {
        let mut original = FieldValue::RouterForm(sample());
        let copy = original.duplicate();

        if let FieldValue::RouterForm(router) = &mut original {
            router
                .slot_mut(OUTBOUND_URL_SLOT)
                .unwrap()
                .value
                .set_value(&["http://other".to_string()])
                .unwrap();
            router.error = "rejected".to_string();
        }

        let FieldValue::RouterForm(copy) = copy else { panic!("expected router") };
        assert_eq!(copy.outbound_url().unwrap().value, "http://orders:8080");
        assert_eq!(copy.error, VALID);
    }

    #[test]
    fn wrong_shape_is_structural() {
        let mut router = sample();
        router.children.pop();
        assert!(router.path().unwrap_err().is_structural());
        assert!(router.slot_mut(PATH_SLOT).unwrap_err().is_structural());

        let mut swapped = sample();
        swapped.children.swap(PATH_SLOT, INGRESS_LABEL_SLOT);
        assert!(swapped.fields().unwrap_err().is_structural());
    }
}

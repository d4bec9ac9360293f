//! # Sync Engine
//!
//! Two-way mapping between a typed configuration document and its form tree.
//!
//! The tree is the source of truth for cardinality: how many routers or
//! processors exist is re-derived from the nodes on every reverse sync. The
//! domain object is the source of truth for values: rendering always starts
//! from it, and a tree is never patched in place after a validation pass.
//!
//! ## Module Organization
//!
//! - `report`: validation reports and the path grammar keying them
//! - `gateway` / `log_sink`: the per-document engines
//! - `render` / `read`: shared helpers for each direction

pub mod gateway;
pub mod log_sink;
mod read;
mod render;
pub mod report;

use std::collections::BTreeMap;

use crate::errors::Result;
use crate::form::{Area, FieldValue, InputNode, ProcessorFormValue, RouterFormValue, TooltipTable};
use crate::observability::Diagnostics;

pub use report::{ReportPath, ValidationReport, NOT_UNIQUE};

/// Old identity key → new identity key for elements moved by `update`.
pub type ChangedKeys = BTreeMap<String, String>;

/// Inputs shared by every config → form pass.
#[derive(Debug, Clone, Copy)]
pub struct SyncContext<'a> {
    pub report: &'a ValidationReport,
    pub tooltips: &'a TooltipTable,
    pub diagnostics: &'a Diagnostics,
}

impl<'a> SyncContext<'a> {
    pub fn new(
        report: &'a ValidationReport,
        tooltips: &'a TooltipTable,
        diagnostics: &'a Diagnostics,
    ) -> Self {
        Self { report, tooltips, diagnostics }
    }
}

/// Shape of the repeatable elements an area holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatableKind {
    /// `RouterForm` nodes interleaved with outbound URL labels
    Router,
    /// Stage labels each followed by `ProcessorForm` alternatives
    ProcessorMatrix,
}

impl RepeatableKind {
    /// Fresh element node of this kind under `key`.
    pub fn blank_node(&self, key: &str) -> InputNode {
        match self {
            RepeatableKind::Router => {
                InputNode::new(key, "Router", FieldValue::RouterForm(RouterFormValue::blank()))
            }
            RepeatableKind::ProcessorMatrix => InputNode::new(
                key,
                "Processor",
                FieldValue::ProcessorForm(ProcessorFormValue::blank()),
            ),
        }
    }
}

/// A typed configuration document that can be edited through areas.
pub trait SyncEngine: Clone {
    /// Root segment of every report path for this document.
    const CONFIG_NAME: &'static str;

    /// Fixed `(key, label)` sequence of areas.
    const AREAS: &'static [(&'static str, &'static str)];

    fn area_keys() -> Vec<&'static str> {
        Self::AREAS.iter().map(|(key, _)| *key).collect()
    }

    fn area_skeletons() -> Vec<Area> {
        Self::AREAS.iter().map(|(key, label)| Area::skeleton(key, label)).collect()
    }

    /// Allocate the area skeletons and fill them from this document.
    fn create_areas(&self, ctx: &SyncContext<'_>) -> Result<Vec<Area>> {
        let mut areas = Self::area_skeletons();
        self.update_areas_from_config(ctx, &mut areas)?;
        Ok(areas)
    }

    /// Rebuild the nodes of every area and overlay the report onto them.
    fn update_areas_from_config(&self, ctx: &SyncContext<'_>, areas: &mut [Area]) -> Result<()>;

    /// Read edited areas back into this document.
    ///
    /// All-or-nothing: on error the document is left exactly as it was.
    fn set_config_from_areas(&mut self, areas: &[Area], diagnostics: &Diagnostics) -> Result<()>;

    /// Normalize ordering, returning the identity remap of moved elements.
    fn update(&mut self, diagnostics: &Diagnostics) -> Result<ChangedKeys>;

    /// Repeatable element shape of an area, `None` for fixed-slot areas.
    fn repeatable(area_key: &str) -> Option<RepeatableKind>;
}

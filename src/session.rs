//! # Edit Sessions
//!
//! One edit transaction per call: validate the working copy, rebuild its
//! areas, apply exactly one command to the tree, then push the tree back
//! through the sync engine on a scratch copy. The session's document is only
//! replaced once the scratch copy has been normalized and persisted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::edit::{self, processors};
use crate::errors::{FormplaneError, Result};
use crate::form::{Area, FieldKind, InputNode, TooltipTable};
use crate::observability::Diagnostics;
use crate::storage::ConfigStore;
use crate::sync::gateway::router_key;
use crate::sync::{ChangedKeys, RepeatableKind, SyncContext, SyncEngine, ValidationReport};
use crate::validation::ConfigValidator;

/// New values for one node, or for one slot of a composite node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSubmission {
    pub area: String,
    pub key: String,
    #[serde(default)]
    pub slot: Option<usize>,
    #[serde(default)]
    pub values: Vec<String>,
}

/// A single tree edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    SetValues { submissions: Vec<FieldSubmission> },
    Append { area: String },
    Insert { area: String, key: String, #[serde(default)] before: bool },
    InsertStage { area: String, key: String, #[serde(default)] before: bool },
    Duplicate { area: String, key: String },
    Delete { area: String, key: String },
}

impl EditCommand {
    pub fn name(&self) -> &'static str {
        match self {
            EditCommand::SetValues { .. } => "set_values",
            EditCommand::Append { .. } => "append",
            EditCommand::Insert { .. } => "insert",
            EditCommand::InsertStage { .. } => "insert_stage",
            EditCommand::Duplicate { .. } => "duplicate",
            EditCommand::Delete { .. } => "delete",
        }
    }

    /// Apply this command to freshly rendered areas of a `C` document.
    fn apply_to<C: SyncEngine>(&self, areas: &mut [Area], diagnostics: &Diagnostics) -> Result<()> {
        match self {
            EditCommand::SetValues { submissions } => {
                for submission in submissions {
                    let area = area_mut(areas, &submission.area)?;
                    edit::set_values(
                        &mut area.nodes,
                        &submission.key,
                        submission.slot,
                        &submission.values,
                        diagnostics,
                    )?;
                }
            }
            EditCommand::Append { area } => {
                let kind = repeatable::<C>(area)?;
                let nodes = &mut area_mut(areas, area)?.nodes;
                match kind {
                    RepeatableKind::Router => {
                        let node = blank_router(nodes);
                        edit::append(nodes, node, diagnostics);
                    }
                    RepeatableKind::ProcessorMatrix => {
                        processors::append_stage(nodes, diagnostics);
                    }
                }
            }
            EditCommand::Insert { area, key, before } => {
                let kind = repeatable::<C>(area)?;
                let nodes = &mut area_mut(areas, area)?.nodes;
                match kind {
                    RepeatableKind::Router => {
                        edit::find_by_key(nodes, key)?.expect_kind(FieldKind::RouterForm)?;
                        let node = blank_router(nodes);
                        edit::insert(nodes, key, node, *before, diagnostics)?;
                    }
                    RepeatableKind::ProcessorMatrix => {
                        processors::insert_alternative(nodes, key, *before, diagnostics)?;
                    }
                }
            }
            EditCommand::InsertStage { area, key, before } => match repeatable::<C>(area)? {
                RepeatableKind::ProcessorMatrix => {
                    let nodes = &mut area_mut(areas, area)?.nodes;
                    processors::insert_stage(nodes, key, *before, diagnostics)?;
                }
                RepeatableKind::Router => {
                    return Err(FormplaneError::submission_field(
                        "stages only exist in processor areas",
                        area.clone(),
                    ));
                }
            },
            EditCommand::Duplicate { area, key } => {
                let expected = match repeatable::<C>(area)? {
                    RepeatableKind::Router => FieldKind::RouterForm,
                    RepeatableKind::ProcessorMatrix => FieldKind::ProcessorForm,
                };
                let nodes = &mut area_mut(areas, area)?.nodes;
                edit::duplicate(nodes, key, expected, diagnostics)?;
            }
            EditCommand::Delete { area, key } => {
                let kind = repeatable::<C>(area)?;
                let nodes = &mut area_mut(areas, area)?.nodes;
                match kind {
                    RepeatableKind::Router => {
                        edit::find_by_key(nodes, key)?.expect_kind(FieldKind::RouterForm)?;
                        edit::delete(nodes, key, diagnostics)?;
                    }
                    RepeatableKind::ProcessorMatrix => {
                        processors::delete_alternative(nodes, key, diagnostics)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Result of one applied command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditOutcome {
    pub changed_keys: ChangedKeys,
    pub checksum: String,
}

/// Translate a key that may have moved during the last `update`.
pub fn relocate(key: &str, changed_keys: &ChangedKeys) -> String {
    changed_keys.get(key).cloned().unwrap_or_else(|| key.to_string())
}

fn area_mut<'a>(areas: &'a mut [Area], key: &str) -> Result<&'a mut Area> {
    areas
        .iter_mut()
        .find(|area| area.key == key)
        .ok_or_else(|| FormplaneError::not_found("areas", key))
}

fn repeatable<C: SyncEngine>(area: &str) -> Result<RepeatableKind> {
    if !C::area_keys().contains(&area) {
        return Err(FormplaneError::not_found("areas", area));
    }
    C::repeatable(area).ok_or_else(|| {
        FormplaneError::submission_field("area has no repeatable elements", area.to_string())
    })
}

fn blank_router(nodes: &[InputNode]) -> InputNode {
    let count = nodes.iter().filter(|node| node.kind() == FieldKind::RouterForm).count();
    RepeatableKind::Router.blank_node(&edit::unique_key(nodes, &router_key(count)))
}

/// One working copy opened for editing.
pub struct EditSession<C, S, V> {
    config: C,
    path: PathBuf,
    store: S,
    validator: V,
    tooltips: TooltipTable,
    diagnostics: Diagnostics,
}

impl<C, S, V> EditSession<C, S, V>
where
    C: SyncEngine,
    S: ConfigStore<C>,
    V: ConfigValidator<C>,
{
    /// Load the working copy at `path`.
    pub fn open(
        store: S,
        validator: V,
        path: impl Into<PathBuf>,
        tooltips: TooltipTable,
    ) -> Result<Self> {
        let path = path.into();
        let diagnostics = Diagnostics::new(C::CONFIG_NAME);
        let config = store.load(&path)?;
        tracing::info!(
            parent: diagnostics.span(),
            path = %path.display(),
            session_id = %diagnostics.session_id(),
            "opened working copy"
        );
        Ok(Self { config, path, store, validator, tooltips, diagnostics })
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn report(&self) -> ValidationReport {
        self.validator.validate(&self.config)
    }

    /// Areas of the current document with its findings overlaid.
    pub fn render(&self) -> Result<Vec<Area>> {
        let report = self.report();
        let ctx = SyncContext::new(&report, &self.tooltips, &self.diagnostics);
        self.config.create_areas(&ctx)
    }

    /// Apply `command`, then normalize and persist the result.
    ///
    /// On any error the session keeps its previous document and nothing is
    /// written.
    pub fn apply(&mut self, command: &EditCommand) -> Result<EditOutcome> {
        let span = self.diagnostics.sync("apply");
        let _guard = span.enter();

        let mut areas = self.render()?;
        command.apply_to::<C>(&mut areas, &self.diagnostics)?;

        let mut scratch = self.config.clone();
        scratch.set_config_from_areas(&areas, &self.diagnostics)?;
        let changed_keys = scratch.update(&self.diagnostics)?;
        let checksum = self.store.write(&scratch, &self.path)?;
        self.config = scratch;

        tracing::info!(
            command = command.name(),
            moved = changed_keys.len(),
            checksum = %checksum,
            "applied edit"
        );
        Ok(EditOutcome { changed_keys, checksum })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    use crate::domain::{GatewayConfig, Outbound, Router};
    use crate::form::router::PATH_SLOT;
    use crate::validation::GatewayValidator;
    use tracing_test::traced_test;

    /// In-memory store counting writes.
    #[derive(Default)]
    struct MemoryStore {
        docs: RefCell<HashMap<PathBuf, GatewayConfig>>,
        writes: RefCell<usize>,
    }

    impl ConfigStore<GatewayConfig> for &MemoryStore {
        fn load(&self, path: &Path) -> Result<GatewayConfig> {
            self.docs
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| FormplaneError::not_found("store", path.display().to_string()))
        }

        fn write(&self, config: &GatewayConfig, path: &Path) -> Result<String> {
            self.docs.borrow_mut().insert(path.to_path_buf(), config.clone());
            *self.writes.borrow_mut() += 1;
            Ok(format!("write-{}", self.writes.borrow()))
        }
    }

    fn router(path: &str, url: &str) -> Router {
        Router {
            path: path.to_string(),
            outbound: Outbound { url: url.to_string(), ..Outbound::default() },
            ..Router::default()
        }
    }

    fn store_with(config: GatewayConfig) -> MemoryStore {
        let store = MemoryStore::default();
        store.docs.borrow_mut().insert(PathBuf::from("gw.json"), config);
        store
    }

    fn open(store: &MemoryStore) -> EditSession<GatewayConfig, &MemoryStore, GatewayValidator> {
        EditSession::open(store, GatewayValidator, "gw.json", TooltipTable::default()).unwrap()
    }

    #[traced_test]
    #[test]
    fn open_logs_session_id() {
        let store = store_with(GatewayConfig::default());
        let session = open(&store);
        assert!(!session.diagnostics().session_id().is_nil());
        assert!(logs_contain(&session.diagnostics().session_id().to_string()));
    }

    #[test]
    fn duplicate_router_persists_copy() {
        let store = store_with(GatewayConfig {
            routers: vec![router("/orders/", "http://a:80")],
            ..GatewayConfig::default()
        });
        let mut session = open(&store);

        let outcome = session
            .apply(&EditCommand::Duplicate { area: "routers".into(), key: "router0".into() })
            .unwrap();

        let paths: Vec<&str> = session.config().routers.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/orders/", "/orders/copy/"]);
        assert_eq!(outcome.checksum, "write-1");
        assert_eq!(store.docs.borrow()[&PathBuf::from("gw.json")], *session.config());
    }

    #[test]
    fn failed_edit_leaves_document_untouched() {
        let original = GatewayConfig {
            routers: vec![router("/orders/", "http://a:80")],
            ..GatewayConfig::default()
        };
        let store = store_with(original.clone());
        let mut session = open(&store);

        let error = session
            .apply(&EditCommand::Delete { area: "routers".into(), key: "router7".into() })
            .unwrap_err();
        assert!(error.is_structural());

        let error = session
            .apply(&EditCommand::Append { area: "general".into() })
            .unwrap_err();
        assert!(matches!(error, FormplaneError::Submission { .. }));

        assert_eq!(*session.config(), original);
        assert_eq!(*store.writes.borrow(), 0);
    }

    #[test]
    fn set_values_reorders_and_reports_moves() {
        let store = store_with(GatewayConfig {
            routers: vec![router("/a/", "http://a:80"), router("/b/", "http://a:80")],
            ..GatewayConfig::default()
        });
        let mut session = open(&store);

        let outcome = session
            .apply(&EditCommand::SetValues {
                submissions: vec![FieldSubmission {
                    area: "routers".into(),
                    key: "router1".into(),
                    slot: Some(PATH_SLOT),
                    values: vec!["/0/".into()],
                }],
            })
            .unwrap();

        assert_eq!(relocate("router1", &outcome.changed_keys), "router0");
        assert_eq!(relocate("router0", &outcome.changed_keys), "router1");
        assert_eq!(relocate("router5", &outcome.changed_keys), "router5");
        assert_eq!(session.config().routers[0].path, "/0/");
    }

    #[test]
    fn processor_stage_round_trip() {
        let store = store_with(GatewayConfig::default());
        let mut session = open(&store);

        session.apply(&EditCommand::Append { area: "request_processors".into() }).unwrap();
        session
            .apply(&EditCommand::Insert {
                area: "request_processors".into(),
                key: "processor0_0".into(),
                before: false,
            })
            .unwrap();
        assert_eq!(session.config().request_processors.len(), 1);
        assert_eq!(session.config().request_processors[0].len(), 2);

        session
            .apply(&EditCommand::InsertStage {
                area: "request_processors".into(),
                key: "processor0_0".into(),
                before: false,
            })
            .unwrap();
        assert_eq!(session.config().request_processors.len(), 2);

        session
            .apply(&EditCommand::Delete {
                area: "request_processors".into(),
                key: "processor1_0".into(),
            })
            .unwrap();
        assert_eq!(session.config().request_processors.len(), 1);
    }

    #[test]
    fn unknown_area_is_not_found() {
        let store = store_with(GatewayConfig::default());
        let mut session = open(&store);
        let error =
            session.apply(&EditCommand::Append { area: "listeners".into() }).unwrap_err();
        assert!(matches!(error, FormplaneError::NotFound { .. }));
    }

    #[test]
    fn commands_deserialize_from_tagged_json() {
        let command: EditCommand =
            serde_json::from_str(r#"{"op":"insert","area":"routers","key":"router0"}"#).unwrap();
        assert_eq!(
            command,
            EditCommand::Insert { area: "routers".into(), key: "router0".into(), before: false }
        );
    }
}

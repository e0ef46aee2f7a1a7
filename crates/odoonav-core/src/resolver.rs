use tracing::debug;
use tracing::warn;

use crate::deeplink::parse_view_modes;
use crate::model::ActionDetail;
use crate::model::ActionKind;
use crate::model::ActionPointer;
use crate::model::ActionRef;
use crate::model::ClientAction;
use crate::model::EnrichedMenu;
use crate::model::MenuMatch;
use crate::model::WindowAction;
use crate::model::CLIENT_ACTION_MODEL;
use crate::model::MENU_MODEL;
use crate::model::WINDOW_ACTION_MODEL;
use crate::store::int_field;
use crate::store::many2one_id;
use crate::store::raw_field;
use crate::store::text_field;
use crate::store::Condition;
use crate::store::Record;
use crate::store::RecordStore;
use crate::store::SearchOptions;

const MENU_FIELDS: [&str; 4] = ["id", "name", "action", "parent_id"];
const WINDOW_ACTION_FIELDS: [&str; 6] = ["id", "name", "res_model", "view_mode", "domain", "context"];
const CLIENT_ACTION_FIELDS: [&str; 5] = ["id", "name", "tag", "context", "params"];

pub struct MetadataResolver<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    menu_search_limit: usize,
}

impl<'a, S: RecordStore + ?Sized> MetadataResolver<'a, S> {
    pub fn new(store: &'a S, menu_search_limit: usize) -> Self {
        Self {
            store,
            menu_search_limit: menu_search_limit.max(1),
        }
    }

    /// Finds the best menu for `label` and enriches it with its action.
    ///
    /// Exact case-insensitive name equality wins; otherwise the store's first
    /// candidate is kept. A match without a usable action reference is `None`.
    pub fn resolve_menu(&self, label: &str) -> Option<EnrichedMenu> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        let options = SearchOptions::fields(&MENU_FIELDS).with_limit(self.menu_search_limit);
        let records = self.search(MENU_MODEL, &[Condition::ilike("name", label)], &options)?;

        let candidates: Vec<MenuMatch> = records.iter().filter_map(decode_menu).collect();
        let wanted = label.to_lowercase();
        let best = candidates
            .iter()
            .find(|candidate| candidate.name.to_lowercase() == wanted)
            .or_else(|| candidates.first())?
            .clone();
        debug!(label, menu_id = best.id, menu = %best.name, "menu candidate selected");

        let Some(action) = best.action_ref.as_ref().and_then(ActionRef::normalize) else {
            debug!(menu_id = best.id, "menu has no usable action");
            return None;
        };
        let detail = self.fetch_action(&action);
        Some(EnrichedMenu {
            menu: best,
            action,
            detail,
        })
    }

    pub fn resolve_action_by_record_kind(&self, kind: &str) -> Option<ActionDetail> {
        let options = SearchOptions::fields(&WINDOW_ACTION_FIELDS).with_limit(1);
        let records = self.search(
            WINDOW_ACTION_MODEL,
            &[Condition::eq("res_model", kind)],
            &options,
        )?;
        records
            .first()
            .and_then(decode_window_action)
            .map(ActionDetail::Window)
    }

    pub fn fetch_action(&self, pointer: &ActionPointer) -> Option<ActionDetail> {
        let condition = [Condition::eq("id", pointer.id)];
        match &pointer.kind {
            ActionKind::Window => {
                let options = SearchOptions::fields(&WINDOW_ACTION_FIELDS).with_limit(1);
                let records = self.search(WINDOW_ACTION_MODEL, &condition, &options)?;
                records
                    .first()
                    .and_then(decode_window_action)
                    .map(ActionDetail::Window)
            }
            ActionKind::Client => {
                let options = SearchOptions::fields(&CLIENT_ACTION_FIELDS).with_limit(1);
                let records = self.search(CLIENT_ACTION_MODEL, &condition, &options)?;
                records
                    .first()
                    .and_then(decode_client_action)
                    .map(ActionDetail::Client)
            }
            ActionKind::Other(model) => {
                debug!(model = %model, id = pointer.id, "no detail lookup for action model");
                None
            }
        }
    }

    fn search(
        &self,
        kind: &str,
        conditions: &[Condition],
        options: &SearchOptions,
    ) -> Option<Vec<Record>> {
        debug!(kind, ?conditions, limit = ?options.limit, "metadata query");
        match self.store.search_read(kind, conditions, options) {
            Ok(records) => Some(records),
            Err(err) => {
                warn!(kind, error = %err, "metadata query failed; treating as no result");
                None
            }
        }
    }
}

fn decode_menu(record: &Record) -> Option<MenuMatch> {
    Some(MenuMatch {
        id: int_field(record, "id")?,
        name: text_field(record, "name").unwrap_or_default().to_string(),
        parent_id: many2one_id(record, "parent_id"),
        action_ref: record.get("action").and_then(ActionRef::from_value),
    })
}

fn decode_window_action(record: &Record) -> Option<WindowAction> {
    Some(WindowAction {
        id: int_field(record, "id")?,
        name: text_field(record, "name").unwrap_or_default().to_string(),
        res_model: text_field(record, "res_model").map(str::to_string),
        view_modes: parse_view_modes(text_field(record, "view_mode").unwrap_or_default()),
        domain: raw_field(record, "domain"),
        context: raw_field(record, "context"),
    })
}

fn decode_client_action(record: &Record) -> Option<ClientAction> {
    Some(ClientAction {
        id: int_field(record, "id")?,
        name: text_field(record, "name").unwrap_or_default().to_string(),
        tag: text_field(record, "tag").map(str::to_string),
        context: raw_field(record, "context"),
        params: raw_field(record, "params"),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::error::StoreError;
    use crate::testing::MemoryStore;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_records(
                MENU_MODEL,
                vec![
                    json!({"id": 10, "name": "Sales Analysis", "action": "ir.actions.act_window,21", "parent_id": [1, "Sales"]}),
                    json!({"id": 11, "name": "Sales", "action": "ir.actions.act_window,20", "parent_id": false}),
                    json!({"id": 12, "name": "Orphan", "action": false, "parent_id": false}),
                    json!({"id": 13, "name": "Broken", "action": "ir.actions.act_window", "parent_id": false}),
                    json!({"id": 14, "name": "Overview", "action": "ir.actions.client,40", "parent_id": false}),
                ],
            )
            .with_records(
                WINDOW_ACTION_MODEL,
                vec![
                    json!({"id": 20, "name": "Orders", "res_model": "sale.order", "view_mode": "list,kanban,form", "domain": false, "context": "{}"}),
                    json!({"id": 21, "name": "Analysis", "res_model": "sale.report", "view_mode": "graph,pivot", "domain": "[]", "context": false}),
                ],
            )
            .with_records(
                CLIENT_ACTION_MODEL,
                vec![json!({"id": 40, "name": "Overview", "tag": "board", "context": "{'dashboard_id': 7}", "params": false})],
            )
    }

    #[test]
    fn exact_match_beats_store_order() {
        let store = store();
        let resolver = MetadataResolver::new(&store, 5);
        let enriched = resolver.resolve_menu("sales").expect("menu");
        assert_eq!(enriched.menu.id, 11);
        assert_eq!(enriched.menu.parent_id, None);
        match enriched.detail.expect("detail") {
            ActionDetail::Window(action) => {
                assert_eq!(action.res_model.as_deref(), Some("sale.order"));
                assert_eq!(action.view_modes, vec!["list", "kanban", "form"]);
            }
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn inexact_match_keeps_first_candidate() {
        let store = store();
        let resolver = MetadataResolver::new(&store, 5);
        let enriched = resolver.resolve_menu("sal").expect("menu");
        assert_eq!(enriched.menu.id, 10);
        assert_eq!(enriched.menu.parent_id, Some(1));
    }

    #[test]
    fn menu_without_usable_action_is_none() {
        let store = store();
        let resolver = MetadataResolver::new(&store, 5);
        assert_eq!(resolver.resolve_menu("orphan"), None);
        assert_eq!(resolver.resolve_menu("broken"), None);
        assert_eq!(resolver.resolve_menu("   "), None);
    }

    #[test]
    fn failed_enrichment_still_returns_the_match() {
        let store = store().failing_on(WINDOW_ACTION_MODEL);
        let resolver = MetadataResolver::new(&store, 5);
        let enriched = resolver.resolve_menu("sales").expect("menu");
        assert_eq!(enriched.action.id, 20);
        assert_eq!(enriched.detail, None);
    }

    #[test]
    fn store_errors_read_as_no_result() {
        let store = store().failing_on(MENU_MODEL);
        let resolver = MetadataResolver::new(&store, 5);
        assert_eq!(resolver.resolve_menu("sales"), None);
        assert!(matches!(
            store.search_read(MENU_MODEL, &[], &SearchOptions::default()),
            Err(StoreError::Transport(_))
        ));
    }

    #[test]
    fn client_actions_are_enriched() {
        let store = store();
        let resolver = MetadataResolver::new(&store, 5);
        let enriched = resolver.resolve_menu("overview").expect("menu");
        match enriched.detail.expect("detail") {
            ActionDetail::Client(action) => assert!(action.is_dashboard()),
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn record_kind_lookup_uses_equality() {
        let store = store();
        let resolver = MetadataResolver::new(&store, 5);
        let action = resolver
            .resolve_action_by_record_kind("sale.report")
            .expect("action");
        assert_eq!(action.id(), 21);
        assert_eq!(resolver.resolve_action_by_record_kind("sale"), None);
    }

    #[test]
    fn menu_search_is_limited() {
        let store = store();
        let resolver = MetadataResolver::new(&store, 3);
        resolver.resolve_menu("zzz");
        let queries = store.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].kind, MENU_MODEL);
        assert_eq!(queries[0].limit, Some(3));
    }
}

use serde_json::json;

pub(super) use super::Navigator;
pub(super) use crate::config::NavigatorSettings;
pub(super) use crate::error::OracleError;
pub(super) use crate::intent::OracleGuess;
pub(super) use crate::model::Intent;
pub(super) use crate::model::IntentKind;
pub(super) use crate::model::ResolutionTier;
pub(super) use crate::model::CLIENT_ACTION_MODEL;
pub(super) use crate::model::MENU_MODEL;
pub(super) use crate::model::WINDOW_ACTION_MODEL;
pub(super) use crate::reducer::CLARIFY_RESPONSE;
pub(super) use crate::state::ResolutionStatus;
pub(super) use crate::testing::MemoryStore;
pub(super) use crate::testing::ScriptedOracle;

mod scenarios;

const BASE: &str = "http://odoo.test";

fn settings() -> NavigatorSettings {
    NavigatorSettings {
        base_url: BASE.to_string(),
        company_id: 1,
        ..NavigatorSettings::default()
    }
}

fn menus() -> Vec<serde_json::Value> {
    vec![
        json!({"id": 2, "name": "Sales Analysis", "action": "ir.actions.act_window,11", "parent_id": [1, "Sales"]}),
        json!({"id": 1, "name": "Sales", "action": "ir.actions.act_window,10", "parent_id": false}),
        json!({"id": 5, "name": "Dashboards", "action": "ir.actions.client,30", "parent_id": false}),
        json!({"id": 7, "name": "Timesheets", "action": ["ir.actions.act_window", 40], "parent_id": false}),
        json!({"id": 8, "name": "Products", "action": "ir.actions.act_window,50", "parent_id": [1, "Sales"]}),
    ]
}

fn window_actions() -> Vec<serde_json::Value> {
    vec![
        json!({"id": 10, "name": "Orders", "res_model": "sale.order", "view_mode": "list,kanban,form", "domain": false, "context": "{}"}),
        json!({"id": 11, "name": "Sales Analysis", "res_model": "sale.report", "view_mode": "graph,pivot", "domain": false, "context": false}),
        json!({"id": 20, "name": "Invoices", "res_model": "account.move", "view_mode": "list,form,kanban", "domain": "[('move_type', '=', 'out_invoice')]", "context": "{'default_move_type': 'out_invoice'}"}),
        json!({"id": 40, "name": "Timesheets", "res_model": "account.analytic.line", "view_mode": "tree,form", "domain": false, "context": false}),
        json!({"id": 50, "name": "Products", "res_model": "product.template", "view_mode": "list,kanban,form", "domain": false, "context": false}),
    ]
}

fn client_actions(context: &str) -> Vec<serde_json::Value> {
    vec![json!({"id": 30, "name": "My Dashboard", "tag": "board", "context": context, "params": false})]
}

fn demo_store() -> MemoryStore {
    MemoryStore::new()
        .with_records(MENU_MODEL, menus())
        .with_records(WINDOW_ACTION_MODEL, window_actions())
        .with_records(
            CLIENT_ACTION_MODEL,
            client_actions("{'dashboard_id': 7, 'uid': uid}"),
        )
}

fn navigator(store: MemoryStore) -> Navigator<MemoryStore> {
    Navigator::new(store, settings())
}

fn guess(entity: &str, confidence: f64) -> OracleGuess {
    OracleGuess {
        kind: IntentKind::Navigation,
        entity: entity.to_string(),
        all_entities: Vec::new(),
        reasoning: None,
        confidence: Some(confidence),
    }
}

use serde_json::Value;
use tracing::debug;

use crate::literal::parse_literal;
use crate::model::ActionDetail;
use crate::model::ClientAction;
use crate::model::EnrichedMenu;
use crate::model::NavigationUrl;
use crate::model::ResolvedTarget;
use crate::model::WindowAction;

const PRODUCT_TEMPLATE: &str = "product.template";
const LIST_FIRST_KINDS: [&str; 3] = ["sale.order", "account.move", "purchase.order"];

pub fn parse_view_modes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|mode| !mode.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn determine_view_type<M: AsRef<str>>(view_modes: &[M], record_kind: Option<&str>) -> String {
    let Some(first) = view_modes.first() else {
        return "list".to_string();
    };
    let has = |wanted: &str| view_modes.iter().any(|mode| mode.as_ref() == wanted);
    match record_kind {
        Some(PRODUCT_TEMPLATE) if has("kanban") => return "kanban".to_string(),
        Some(kind) if LIST_FIRST_KINDS.contains(&kind) && has("list") => {
            return "list".to_string()
        }
        _ => {}
    }
    match first.as_ref() {
        "tree" => "list".to_string(),
        other => other.to_string(),
    }
}

/// Dashboard id of a `board` client action: the context's `dashboard_id`, else the
/// params' `dashboard_id`, else `default_id`. Text fields are read with the restricted
/// literal parser; unparsable or non-positive values are ignored.
pub fn extract_dashboard_id(action: &ClientAction, default_id: i64) -> i64 {
    dashboard_id_in(&action.context)
        .or_else(|| dashboard_id_in(&action.params))
        .unwrap_or(default_id)
}

fn dashboard_id_in(field: &Value) -> Option<i64> {
    let parsed;
    let object = match field {
        Value::Object(map) => map,
        Value::String(text) => {
            parsed = match parse_literal(text) {
                Ok(value) => value,
                Err(err) => {
                    debug!(error = %err, "unreadable action context");
                    return None;
                }
            };
            parsed.as_object()?
        }
        _ => return None,
    };
    match object.get("dashboard_id")? {
        Value::Number(number) => number.as_i64().filter(|id| *id > 0),
        Value::String(text) => text.trim().parse::<i64>().ok().filter(|id| *id > 0),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLinkBuilder {
    base_url: String,
    company_id: i64,
    default_dashboard_id: i64,
}

impl DeepLinkBuilder {
    pub fn new(base_url: impl Into<String>, company_id: i64, default_dashboard_id: i64) -> Self {
        Self {
            base_url: base_url.into(),
            company_id,
            default_dashboard_id,
        }
    }

    pub fn root(&self) -> NavigationUrl {
        NavigationUrl::root(&self.base_url)
    }

    pub fn build_from_menu(&self, enriched: &EnrichedMenu) -> Option<NavigationUrl> {
        let target = self.target_for(
            enriched.action.id,
            Some(enriched.menu.id),
            enriched.detail.as_ref(),
            None,
        );
        Some(target.render(&self.base_url))
    }

    pub fn build_from_action(
        &self,
        action: &ActionDetail,
        record_kind: Option<&str>,
    ) -> Option<NavigationUrl> {
        if action.id() <= 0 {
            return None;
        }
        let target = self.target_for(action.id(), None, Some(action), record_kind);
        Some(target.render(&self.base_url))
    }

    fn target_for(
        &self,
        action_id: i64,
        menu_id: Option<i64>,
        detail: Option<&ActionDetail>,
        record_kind_hint: Option<&str>,
    ) -> ResolvedTarget {
        let mut target = ResolvedTarget {
            action_id,
            menu_id,
            record_kind: None,
            view_type: None,
            dashboard_id: None,
            company_id: self.company_id,
        };
        match detail {
            Some(ActionDetail::Client(client)) if client.is_dashboard() => {
                target.dashboard_id = Some(extract_dashboard_id(client, self.default_dashboard_id));
            }
            Some(ActionDetail::Window(window)) => {
                if let Some(kind) = window_record_kind(window, record_kind_hint) {
                    target.view_type = Some(determine_view_type(&window.view_modes, Some(kind)));
                    target.record_kind = Some(kind.to_string());
                }
            }
            Some(ActionDetail::Client(_)) | None => {}
        }
        target
    }
}

fn window_record_kind<'a>(window: &'a WindowAction, hint: Option<&'a str>) -> Option<&'a str> {
    window
        .res_model
        .as_deref()
        .or(hint)
        .filter(|kind| !kind.is_empty())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::ActionKind;
    use crate::model::ActionPointer;
    use crate::model::MenuMatch;

    fn builder() -> DeepLinkBuilder {
        DeepLinkBuilder::new("http://odoo", 1, 2)
    }

    fn board(context: Value, params: Value) -> ClientAction {
        ClientAction {
            id: 40,
            name: "Overview".to_string(),
            tag: Some("board".to_string()),
            context,
            params,
        }
    }

    fn menu_with(kind: ActionKind, detail: Option<ActionDetail>) -> EnrichedMenu {
        EnrichedMenu {
            menu: MenuMatch {
                id: 9,
                name: "Menu".to_string(),
                parent_id: None,
                action_ref: None,
            },
            action: ActionPointer { kind, id: 40 },
            detail,
        }
    }

    #[test]
    fn view_type_rules() {
        assert_eq!(determine_view_type(&["tree", "form"], Some("res.partner")), "list");
        assert_eq!(determine_view_type(&["kanban"], Some("product.template")), "kanban");
        assert_eq!(determine_view_type::<&str>(&[], Some("sale.order")), "list");
        assert_eq!(determine_view_type(&["list"], Some("sale.order")), "list");
        assert_eq!(determine_view_type(&["form", "list"], Some("account.move")), "list");
        assert_eq!(determine_view_type(&["form", "list"], Some("res.partner")), "form");
        assert_eq!(determine_view_type(&["list", "kanban"], Some("product.template")), "kanban");
        assert_eq!(determine_view_type(&["graph", "pivot"], None), "graph");
    }

    #[test]
    fn view_modes_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(parse_view_modes(" tree , form,,"), vec!["tree", "form"]);
        assert!(parse_view_modes("").is_empty());
    }

    #[test]
    fn dashboard_id_from_context_text() {
        let action = board(json!("{'dashboard_id': 7, 'uid': uid}"), Value::Null);
        assert_eq!(extract_dashboard_id(&action, 2), 7);
    }

    #[test]
    fn dashboard_id_from_params_then_default() {
        let action = board(json!("{}"), json!({"dashboard_id": "5"}));
        assert_eq!(extract_dashboard_id(&action, 2), 5);
        let action = board(json!("{'dashboard_id': False}"), json!("garbage("));
        assert_eq!(extract_dashboard_id(&action, 2), 2);
        let action = board(Value::Null, Value::Null);
        assert_eq!(extract_dashboard_id(&action, 2), 2);
    }

    #[test]
    fn deeply_nested_context_falls_back() {
        let levels = 3_000;
        let context = format!("{{'dashboard_id': {}1{}}}", "[".repeat(levels), "]".repeat(levels));

        let action = board(json!(context), Value::Null);
        assert_eq!(extract_dashboard_id(&action, 2), 2);
        let action = board(json!(context), json!({"dashboard_id": 9}));
        assert_eq!(extract_dashboard_id(&action, 2), 9);
    }

    #[test]
    fn dashboard_menu_url_shape() {
        let menu = menu_with(
            ActionKind::Client,
            Some(ActionDetail::Client(board(json!({"dashboard_id": 7}), Value::Null))),
        );
        assert_eq!(
            builder().build_from_menu(&menu).expect("url").as_str(),
            "http://odoo/web#dashboard_id=7&cids=1&menu_id=9&action=40"
        );
    }

    #[test]
    fn generic_client_and_unenriched_menus_share_a_shape() {
        let client = ClientAction {
            tag: Some("mail.action_discuss".to_string()),
            ..board(Value::Null, Value::Null)
        };
        let menu = menu_with(ActionKind::Client, Some(ActionDetail::Client(client)));
        let expected = "http://odoo/web#action=40&cids=1&menu_id=9";
        assert_eq!(builder().build_from_menu(&menu).expect("url").as_str(), expected);

        let bare = menu_with(ActionKind::Window, None);
        assert_eq!(builder().build_from_menu(&bare).expect("url").as_str(), expected);
    }

    #[test]
    fn window_action_without_model_omits_model_and_view() {
        let action = ActionDetail::Window(WindowAction {
            id: 33,
            name: "Odd".to_string(),
            res_model: None,
            view_modes: vec!["form".to_string()],
            domain: Value::Null,
            context: Value::Null,
        });
        assert_eq!(
            builder().build_from_action(&action, None).expect("url").as_str(),
            "http://odoo/web#action=33&cids=1"
        );
    }

    #[test]
    fn record_kind_action_url_has_no_menu() {
        let action = ActionDetail::Window(WindowAction {
            id: 50,
            name: "Invoices".to_string(),
            res_model: Some("account.move".to_string()),
            view_modes: vec!["list".to_string(), "form".to_string()],
            domain: Value::Null,
            context: Value::Null,
        });
        assert_eq!(
            builder()
                .build_from_action(&action, Some("account.move"))
                .expect("url")
                .as_str(),
            "http://odoo/web#action=50&model=account.move&view_type=list&cids=1"
        );
    }
}

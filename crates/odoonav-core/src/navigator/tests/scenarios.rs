use super::*;
use pretty_assertions::assert_eq;

#[test]
fn go_to_sales_resolves_through_the_sales_menu() {
    let nav = navigator(demo_store());
    let outcome = nav.run("go to sales");

    assert_eq!(outcome.tier, Some(ResolutionTier::MenuTarget(0)));
    assert_eq!(
        outcome.url.as_ref().map(|url| url.as_str()),
        Some("http://odoo.test/web#action=10&model=sale.order&view_type=list&cids=1&menu_id=1")
    );
    assert_eq!(
        outcome.response,
        "🔗 Navigate to sales: http://odoo.test/web#action=10&model=sale.order&view_type=list&cids=1&menu_id=1"
    );
    assert!(outcome.response.contains("model=sale.order&view_type=list"));
}

#[test]
fn open_invoicing_page_uses_the_record_kind_tier() {
    let store = demo_store();
    let nav = navigator(store);
    let outcome = nav.run("open invoicing page");

    let intent = outcome.intent.clone().expect("intent");
    assert_eq!(intent.entity, "invoicing");
    assert_eq!(intent.navigation_targets, vec!["Invoicing", "invoicing"]);
    assert_eq!(outcome.tier, Some(ResolutionTier::RecordKind));
    assert_eq!(
        outcome.url.map(|url| url.into_string()),
        Some("http://odoo.test/web#action=20&model=account.move&view_type=list&cids=1".to_string())
    );

    let kinds: Vec<String> = nav
        .store()
        .queries()
        .into_iter()
        .map(|query| query.kind)
        .collect();
    assert_eq!(kinds, vec![MENU_MODEL, MENU_MODEL, WINDOW_ACTION_MODEL]);
}

#[test]
fn unrecognizable_input_asks_for_clarification_without_queries() {
    let nav = navigator(demo_store());
    let outcome = nav.run("what's the weather");

    assert_eq!(outcome.response, CLARIFY_RESPONSE);
    assert_eq!(outcome.status, ResolutionStatus::ResponseComposed);
    assert_eq!(outcome.intent.map(|intent| intent.kind), Some(IntentKind::Unknown));
    assert!(nav.store().queries().is_empty());
}

#[test]
fn dashboard_menu_carries_the_context_dashboard_id() {
    let nav = navigator(demo_store());
    let outcome = nav.run("go to dashboard");

    assert_eq!(
        outcome.url.map(|url| url.into_string()),
        Some("http://odoo.test/web#dashboard_id=7&cids=1&menu_id=5&action=30".to_string())
    );
}

#[test]
fn dashboard_without_any_id_defaults_to_two() {
    let store = MemoryStore::new()
        .with_records(MENU_MODEL, menus())
        .with_records(CLIENT_ACTION_MODEL, client_actions("{}"));
    let nav = navigator(store);
    let url = nav.run("open dashboards").url.expect("url");

    assert!(url.as_str().contains("dashboard_id=2"), "{url}");
}

#[test]
fn unmapped_entity_resolves_through_the_literal_tier() {
    let nav = navigator(demo_store());
    let outcome = nav.run("open the timesheets page");

    assert_eq!(outcome.tier, Some(ResolutionTier::LiteralEntity));
    assert_eq!(
        outcome.url.map(|url| url.into_string()),
        Some(
            "http://odoo.test/web#action=40&model=account.analytic.line&view_type=list&cids=1&menu_id=7"
                .to_string()
        )
    );
}

#[test]
fn product_menu_prefers_kanban() {
    let nav = navigator(demo_store());
    let url = nav.run("show products").url.expect("url");

    assert!(
        url.as_str()
            .contains("model=product.template&view_type=kanban"),
        "{url}"
    );
}

#[test]
fn confident_oracle_guess_drives_resolution() {
    let nav = navigator(demo_store())
        .with_oracle(Box::new(ScriptedOracle::replying(guess("sales/orders", 0.9))));
    let outcome = nav.run("I want to see what we sold last month");

    assert_eq!(nav.oracle_name(), Some("scripted"));
    assert_eq!(outcome.intent.map(|intent| intent.entity), Some("sales/orders".to_string()));
    assert_eq!(outcome.tier, Some(ResolutionTier::MenuTarget(0)));
}

#[test]
fn failing_oracle_falls_back_to_rules() {
    let nav = navigator(demo_store()).with_oracle(Box::new(ScriptedOracle::failing(
        OracleError::Unavailable("no key".to_string()),
    )));
    let outcome = nav.run("go to sales");

    assert_eq!(outcome.tier, Some(ResolutionTier::MenuTarget(0)));
}

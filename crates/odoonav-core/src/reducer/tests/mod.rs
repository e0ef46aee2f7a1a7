use pretty_assertions::assert_eq;

pub(super) use super::compose_response;
pub(super) use super::reduce;
pub(super) use super::CLARIFY_RESPONSE;
pub(super) use super::NOT_UNDERSTOOD_RESPONSE;
pub(super) use crate::actions::ResolutionAction;
pub(super) use crate::actions::ResolutionEffect;
pub(super) use crate::model::Intent;
pub(super) use crate::model::NavigationUrl;
pub(super) use crate::model::ResolutionTier;
pub(super) use crate::state::ResolutionState;
pub(super) use crate::state::ResolutionStatus;


fn begun(input: &str) -> ResolutionState {
    let mut state = ResolutionState::new();
    let effects = reduce(
        &mut state,
        ResolutionAction::Begin {
            input: input.to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![ResolutionEffect::ParseIntent {
            input: input.to_string()
        }]
    );
    state
}

fn sales_intent() -> Intent {
    Intent::navigation(
        "sales",
        vec!["Sales".to_string(), "sale".to_string()],
        Some("sale.order".to_string()),
        "go to sales",
    )
}

fn url(text: &str) -> NavigationUrl {
    NavigationUrl::root(text)
}

fn finish(mut state: ResolutionState, action: ResolutionAction) -> ResolutionState {
    let effects = reduce(&mut state, action);
    if effects.contains(&ResolutionEffect::ComposeResponse) {
        reduce(&mut state, ResolutionAction::ComposeResponse);
    }
    state
}

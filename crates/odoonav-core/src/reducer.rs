use tracing::trace;
use tracing::warn;

use super::actions::ResolutionAction;
use super::actions::ResolutionEffect;
use super::model::IntentKind;
use super::state::ResolutionState;
use super::state::ResolutionStatus;
use super::workflow::transition;

pub const CLARIFY_RESPONSE: &str = "❓ I can only help with Odoo page navigation. Please specify which Odoo page or module you'd like to navigate to (e.g., 'go to sales', 'open invoices').";
pub const NOT_UNDERSTOOD_RESPONSE: &str =
    "❓ I couldn't understand your navigation request. Please try again.";

pub fn reduce(state: &mut ResolutionState, action: ResolutionAction) -> Vec<ResolutionEffect> {
    let label = action.label();
    let effects = match action {
        ResolutionAction::Begin { input } => {
            if state.status != ResolutionStatus::Start || state.input.is_some() {
                return ignored(state, label);
            }
            state.input = Some(input.clone());
            vec![ResolutionEffect::ParseIntent { input }]
        }
        ResolutionAction::IntentParsed(intent) => {
            if state.input.is_none() || !advance(state, ResolutionStatus::IntentParsed) {
                return ignored(state, label);
            }
            let navigate = intent.kind == IntentKind::Navigation;
            state.intent = Some(intent.clone());
            if navigate {
                vec![ResolutionEffect::GenerateNavigation { intent }]
            } else {
                advance(state, ResolutionStatus::Error);
                vec![ResolutionEffect::ComposeResponse]
            }
        }
        ResolutionAction::ParseFailed(message) => {
            if state.input.is_none() || !advance(state, ResolutionStatus::Error) {
                return ignored(state, label);
            }
            state.error = Some(format!("Error parsing intent: {message}"));
            vec![ResolutionEffect::ComposeResponse]
        }
        ResolutionAction::NavigationGenerated { url, tier } => {
            if !advance(state, ResolutionStatus::NavigationGenerated) {
                return ignored(state, label);
            }
            state.url = Some(url);
            state.tier = Some(tier);
            vec![ResolutionEffect::ComposeResponse]
        }
        ResolutionAction::NavigationFailed(message) => {
            if state.status != ResolutionStatus::IntentParsed
                || !advance(state, ResolutionStatus::Error)
            {
                return ignored(state, label);
            }
            state.error = Some(format!("Error generating navigation: {message}"));
            vec![ResolutionEffect::ComposeResponse]
        }
        ResolutionAction::ComposeResponse => {
            let response = compose_response(state);
            if !advance(state, ResolutionStatus::ResponseComposed) {
                return ignored(state, label);
            }
            state.response = Some(response);
            Vec::new()
        }
    };
    trace!(action = label, status = state.status.label(), "resolution step");
    effects
}

pub fn compose_response(state: &ResolutionState) -> String {
    match (state.status, state.error.as_deref(), state.url.as_ref()) {
        (ResolutionStatus::Error, Some(message), _) => format!("❌ Error: {message}"),
        (ResolutionStatus::NavigationGenerated, _, Some(url)) => {
            let entity = state
                .intent
                .as_ref()
                .map(|intent| intent.entity.as_str())
                .filter(|entity| !entity.is_empty())
                .unwrap_or("page");
            format!("🔗 Navigate to {entity}: {url}")
        }
        _ if state
            .intent
            .as_ref()
            .is_some_and(|intent| intent.kind == IntentKind::Unknown) =>
        {
            CLARIFY_RESPONSE.to_string()
        }
        _ => NOT_UNDERSTOOD_RESPONSE.to_string(),
    }
}

fn advance(state: &mut ResolutionState, to: ResolutionStatus) -> bool {
    if transition(state.status, to).is_none() {
        return false;
    }
    state.status = to;
    state.trail.push(to);
    true
}

fn ignored(state: &ResolutionState, action: &'static str) -> Vec<ResolutionEffect> {
    warn!(action, status = state.status.label(), "ignoring invalid resolution transition");
    Vec::new()
}

#[cfg(test)]
mod tests;

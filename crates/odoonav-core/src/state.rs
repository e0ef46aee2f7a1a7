use serde::Deserialize;
use serde::Serialize;

use super::model::Intent;
use super::model::NavigationUrl;
use super::model::ResolutionTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    Start,
    IntentParsed,
    NavigationGenerated,
    Error,
    ResponseComposed,
}

impl ResolutionStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::IntentParsed => "intent_parsed",
            Self::NavigationGenerated => "navigation_generated",
            Self::Error => "error",
            Self::ResponseComposed => "response_composed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionState {
    pub status: ResolutionStatus,
    pub input: Option<String>,
    pub intent: Option<Intent>,
    pub url: Option<NavigationUrl>,
    pub tier: Option<ResolutionTier>,
    /// Set only for failures; an unknown intent reaches `Error` without one.
    pub error: Option<String>,
    pub response: Option<String>,
    pub trail: Vec<ResolutionStatus>,
}

impl Default for ResolutionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionState {
    pub fn new() -> Self {
        Self {
            status: ResolutionStatus::Start,
            input: None,
            intent: None,
            url: None,
            tier: None,
            error: None,
            response: None,
            trail: vec![ResolutionStatus::Start],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status == ResolutionStatus::ResponseComposed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionOutcome {
    pub input: String,
    pub status: ResolutionStatus,
    pub intent: Option<Intent>,
    pub url: Option<NavigationUrl>,
    pub tier: Option<ResolutionTier>,
    pub error: Option<String>,
    pub response: String,
    pub trail: Vec<ResolutionStatus>,
}

impl From<ResolutionState> for ResolutionOutcome {
    fn from(state: ResolutionState) -> Self {
        Self {
            input: state.input.unwrap_or_default(),
            status: state.status,
            intent: state.intent,
            url: state.url,
            tier: state.tier,
            error: state.error,
            response: state
                .response
                .unwrap_or_else(|| super::reducer::NOT_UNDERSTOOD_RESPONSE.to_string()),
            trail: state.trail,
        }
    }
}

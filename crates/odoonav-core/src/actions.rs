use super::model::Intent;
use super::model::NavigationUrl;
use super::model::ResolutionTier;

#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionAction {
    Begin {
        input: String,
    },
    IntentParsed(Intent),
    ParseFailed(String),
    NavigationGenerated {
        url: NavigationUrl,
        tier: ResolutionTier,
    },
    NavigationFailed(String),
    ComposeResponse,
}

impl ResolutionAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Begin { .. } => "begin",
            Self::IntentParsed(_) => "intent_parsed",
            Self::ParseFailed(_) => "parse_failed",
            Self::NavigationGenerated { .. } => "navigation_generated",
            Self::NavigationFailed(_) => "navigation_failed",
            Self::ComposeResponse => "compose_response",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionEffect {
    ParseIntent { input: String },
    GenerateNavigation { intent: Intent },
    ComposeResponse,
}

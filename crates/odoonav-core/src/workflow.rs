use super::state::ResolutionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ParseIntent,
    GenerateNavigation,
    ComposeResponse,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ParseIntent => "parse_intent",
            Self::GenerateNavigation => "generate_navigation",
            Self::ComposeResponse => "compose_response",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionSpec {
    pub from: ResolutionStatus,
    pub to: ResolutionStatus,
    pub stage: Stage,
}

const TRANSITIONS: [TransitionSpec; 6] = [
    TransitionSpec {
        from: ResolutionStatus::Start,
        to: ResolutionStatus::IntentParsed,
        stage: Stage::ParseIntent,
    },
    TransitionSpec {
        from: ResolutionStatus::Start,
        to: ResolutionStatus::Error,
        stage: Stage::ParseIntent,
    },
    TransitionSpec {
        from: ResolutionStatus::IntentParsed,
        to: ResolutionStatus::NavigationGenerated,
        stage: Stage::GenerateNavigation,
    },
    TransitionSpec {
        from: ResolutionStatus::IntentParsed,
        to: ResolutionStatus::Error,
        stage: Stage::GenerateNavigation,
    },
    TransitionSpec {
        from: ResolutionStatus::NavigationGenerated,
        to: ResolutionStatus::ResponseComposed,
        stage: Stage::ComposeResponse,
    },
    TransitionSpec {
        from: ResolutionStatus::Error,
        to: ResolutionStatus::ResponseComposed,
        stage: Stage::ComposeResponse,
    },
];

pub fn transitions() -> &'static [TransitionSpec] {
    &TRANSITIONS
}

pub fn transition(from: ResolutionStatus, to: ResolutionStatus) -> Option<&'static TransitionSpec> {
    TRANSITIONS
        .iter()
        .find(|spec| spec.from == from && spec.to == to)
}

use std::any::Any;
use std::collections::VecDeque;
use std::panic::catch_unwind;
use std::panic::AssertUnwindSafe;
use std::sync::Mutex;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::actions::ResolutionAction;
use crate::actions::ResolutionEffect;
use crate::config::NavigatorSettings;
use crate::deeplink::DeepLinkBuilder;
use crate::error::PipelineError;
use crate::intent::IntentOracle;
use crate::intent::IntentParser;
use crate::journal::JournalEntry;
use crate::journal::ResolutionJournal;
use crate::model::Intent;
use crate::model::NavigationUrl;
use crate::model::ResolutionTier;
use crate::reducer::reduce;
use crate::resolver::MetadataResolver;
use crate::state::ResolutionOutcome;
use crate::state::ResolutionState;
use crate::store::RecordStore;
use crate::workflow::Stage;

pub struct Navigator<S> {
    store: S,
    oracle: Option<Box<dyn IntentOracle>>,
    settings: NavigatorSettings,
    journal: Option<Mutex<ResolutionJournal>>,
}

impl<S: RecordStore> Navigator<S> {
    pub fn new(store: S, settings: NavigatorSettings) -> Self {
        Self {
            store,
            oracle: None,
            settings,
            journal: None,
        }
    }

    pub fn with_oracle(mut self, oracle: Box<dyn IntentOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn with_journal(mut self, journal: ResolutionJournal) -> Self {
        self.journal = Some(Mutex::new(journal));
        self
    }

    pub fn settings(&self) -> &NavigatorSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn oracle_name(&self) -> Option<&str> {
        self.oracle.as_deref().map(|oracle| oracle.name())
    }

    pub fn resolve(&self, text: &str) -> String {
        self.run(text).response
    }

    pub fn run(&self, text: &str) -> ResolutionOutcome {
        let mut state = ResolutionState::new();
        let mut pending: VecDeque<ResolutionEffect> = reduce(
            &mut state,
            ResolutionAction::Begin {
                input: text.to_string(),
            },
        )
        .into();

        while let Some(effect) = pending.pop_front() {
            let action = match effect {
                ResolutionEffect::ParseIntent { input } => {
                    match guarded(Stage::ParseIntent, || self.parser().parse(&input)) {
                        Ok(Ok(intent)) => ResolutionAction::IntentParsed(intent),
                        Ok(Err(err)) | Err(err) => ResolutionAction::ParseFailed(err.to_string()),
                    }
                }
                ResolutionEffect::GenerateNavigation { intent } => {
                    match guarded(Stage::GenerateNavigation, || self.synthesize_traced(&intent)) {
                        Ok((url, tier)) => ResolutionAction::NavigationGenerated { url, tier },
                        Err(err) => ResolutionAction::NavigationFailed(err.to_string()),
                    }
                }
                ResolutionEffect::ComposeResponse => ResolutionAction::ComposeResponse,
            };
            pending.extend(reduce(&mut state, action));
        }

        let outcome = ResolutionOutcome::from(state);
        self.record(&outcome);
        outcome
    }

    /// The outer fallback chain. Total: the weakest result is the application root.
    pub fn synthesize(&self, intent: &Intent) -> NavigationUrl {
        self.synthesize_traced(intent).0
    }

    pub fn synthesize_traced(&self, intent: &Intent) -> (NavigationUrl, ResolutionTier) {
        let resolver = MetadataResolver::new(&self.store, self.settings.menu_search_limit);
        let links = DeepLinkBuilder::new(
            self.settings.base_url.as_str(),
            self.settings.company_id,
            self.settings.default_dashboard_id,
        );

        for (index, label) in intent.navigation_targets.iter().enumerate() {
            debug!(tier = "menu_target", index, label = %label, "trying tier");
            let url = resolver
                .resolve_menu(label)
                .and_then(|menu| links.build_from_menu(&menu));
            if let Some(url) = url {
                return produced(url, ResolutionTier::MenuTarget(index));
            }
        }

        if let Some(kind) = intent.record_kind.as_deref() {
            debug!(tier = "record_kind", kind, "trying tier");
            let url = resolver
                .resolve_action_by_record_kind(kind)
                .and_then(|action| links.build_from_action(&action, Some(kind)));
            if let Some(url) = url {
                return produced(url, ResolutionTier::RecordKind);
            }
        }

        let entity = intent.entity.trim();
        if !entity.is_empty() {
            debug!(tier = "literal_entity", entity, "trying tier");
            let url = resolver
                .resolve_menu(entity)
                .and_then(|menu| links.build_from_menu(&menu));
            if let Some(url) = url {
                return produced(url, ResolutionTier::LiteralEntity);
            }
        }

        produced(links.root(), ResolutionTier::Root)
    }

    fn parser(&self) -> IntentParser<'_> {
        IntentParser::new(
            self.oracle.as_deref(),
            self.settings.min_confidence,
            self.settings.max_input_chars,
        )
    }

    fn record(&self, outcome: &ResolutionOutcome) {
        let Some(journal) = self.journal.as_ref() else {
            return;
        };
        let entry = JournalEntry::from_outcome(outcome);
        match journal.lock() {
            Ok(mut journal) => {
                if let Err(err) = journal.append(entry) {
                    warn!(error = %err, "could not append to resolution journal");
                }
            }
            Err(_) => warn!("resolution journal lock poisoned; entry dropped"),
        }
    }
}

fn produced(url: NavigationUrl, tier: ResolutionTier) -> (NavigationUrl, ResolutionTier) {
    info!(tier = %tier, url = %url, "navigation url produced");
    (url, tier)
}

fn guarded<T>(stage: Stage, work: impl FnOnce() -> T) -> Result<T, PipelineError> {
    catch_unwind(AssertUnwindSafe(work)).map_err(|payload| {
        let message = panic_message(payload.as_ref());
        warn!(stage = stage.as_str(), %message, "pipeline stage panicked");
        PipelineError::StagePanicked {
            stage: stage.as_str(),
            message,
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        return (*text).to_string();
    }
    if let Some(text) = payload.downcast_ref::<String>() {
        return text.clone();
    }
    "unknown panic".to_string()
}

#[cfg(test)]
mod tests;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::error::OracleError;
use crate::error::PipelineError;
use crate::fallback::extract_entity;
use crate::model::Intent;
use crate::model::IntentKind;
use crate::vocabulary::EntityMapper;

/// What a text-understanding oracle believes the user asked for. Never trusted
/// directly: the entity is re-mapped through the static tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleGuess {
    pub kind: IntentKind,
    pub entity: String,
    #[serde(default)]
    pub all_entities: Vec<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

pub trait IntentOracle: Send + Sync {
    fn name(&self) -> &str;

    fn extract_intent(&self, text: &str) -> Result<OracleGuess, OracleError>;
}

pub struct IntentParser<'a> {
    oracle: Option<&'a dyn IntentOracle>,
    min_confidence: f64,
    max_input_chars: usize,
}

impl<'a> IntentParser<'a> {
    pub fn new(
        oracle: Option<&'a dyn IntentOracle>,
        min_confidence: f64,
        max_input_chars: usize,
    ) -> Self {
        Self {
            oracle,
            min_confidence,
            max_input_chars,
        }
    }

    pub fn parse(&self, text: &str) -> Result<Intent, PipelineError> {
        let normalized = text.trim().to_lowercase();
        let length = normalized.chars().count();
        if length > self.max_input_chars {
            return Err(PipelineError::InvalidInput(format!(
                "input is {length} characters long; the limit is {}",
                self.max_input_chars
            )));
        }
        if normalized.is_empty() {
            return Ok(Intent::unknown(normalized));
        }

        if let Some(oracle) = self.oracle {
            match oracle.extract_intent(&normalized) {
                Ok(guess) => {
                    if let Some(intent) = self.accept_guess(&guess, &normalized) {
                        debug!(oracle = oracle.name(), entity = %intent.entity, "oracle guess accepted");
                        return Ok(intent);
                    }
                    debug!(oracle = oracle.name(), entity = %guess.entity, "oracle guess rejected");
                }
                Err(err) => {
                    warn!(oracle = oracle.name(), error = %err, "oracle failed; using rule-based parsing");
                }
            }
        }

        Ok(fallback_intent(&normalized))
    }

    fn accept_guess(&self, guess: &OracleGuess, normalized: &str) -> Option<Intent> {
        let confidence = guess.confidence.unwrap_or(1.0);
        if confidence < self.min_confidence {
            return None;
        }
        let entity = guess.entity.trim().to_lowercase();
        if entity.is_empty() {
            return None;
        }
        let (targets, record_kind) = map_entity_path(&entity)?;
        Some(Intent::navigation(entity, targets, record_kind, normalized))
    }
}

pub fn map_entity_path(entity: &str) -> Option<(Vec<String>, Option<String>)> {
    let whole = map_entity(entity);
    if whole.is_some() || !entity.contains('/') {
        return whole;
    }
    entity.split('/').find_map(map_entity)
}

fn map_entity(entity: &str) -> Option<(Vec<String>, Option<String>)> {
    let targets = EntityMapper::map_to_targets(entity);
    let record_kind = EntityMapper::map_to_record_kind(entity).map(str::to_string);
    if targets.is_empty() && record_kind.is_none() {
        return None;
    }
    Some((targets, record_kind))
}

fn fallback_intent(normalized: &str) -> Intent {
    let entity = extract_entity(normalized);
    if entity.is_empty() {
        return Intent::unknown(normalized);
    }
    let targets = EntityMapper::map_to_targets(&entity);
    let record_kind = EntityMapper::map_to_record_kind(&entity).map(str::to_string);
    Intent::navigation(entity, targets, record_kind, normalized)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::ScriptedOracle;

    fn guess(entity: &str, confidence: Option<f64>) -> OracleGuess {
        OracleGuess {
            kind: IntentKind::Navigation,
            entity: entity.to_string(),
            all_entities: Vec::new(),
            reasoning: None,
            confidence,
        }
    }

    #[test]
    fn rule_based_parse_without_oracle() {
        let parser = IntentParser::new(None, 0.3, 500);
        let intent = parser.parse("  Go to Sales ").expect("intent");
        assert_eq!(intent.kind, IntentKind::Navigation);
        assert_eq!(intent.entity, "sales");
        assert_eq!(intent.record_kind.as_deref(), Some("sale.order"));
        assert_eq!(intent.navigation_targets, vec!["Sales", "sale"]);
        assert_eq!(intent.original_input, "go to sales");
    }

    #[test]
    fn empty_input_is_unknown_and_skips_the_oracle() {
        let oracle = ScriptedOracle::replying(guess("sales", Some(0.9)));
        let parser = IntentParser::new(Some(&oracle), 0.3, 500);
        let intent = parser.parse("   ").expect("intent");
        assert_eq!(intent.kind, IntentKind::Unknown);
        assert_eq!(oracle.calls(), 0);
    }

    #[test]
    fn overlong_input_is_rejected() {
        let parser = IntentParser::new(None, 0.3, 10);
        let err = parser.parse("go to the sales orders").expect_err("too long");
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn confident_mapped_guess_wins() {
        let oracle = ScriptedOracle::replying(guess("Invoices", Some(0.9)));
        let parser = IntentParser::new(Some(&oracle), 0.3, 500);
        let intent = parser.parse("show me what customers owe").expect("intent");
        assert_eq!(intent.entity, "invoices");
        assert_eq!(intent.record_kind.as_deref(), Some("account.move"));
        assert_eq!(oracle.calls(), 1);
    }

    #[test]
    fn compound_path_maps_through_first_known_component() {
        let oracle = ScriptedOracle::replying(guess("sales/products/analysis", None));
        let parser = IntentParser::new(Some(&oracle), 0.3, 500);
        let intent = parser.parse("sales product analysis").expect("intent");
        assert_eq!(intent.entity, "sales/products/analysis");
        assert_eq!(intent.navigation_targets, vec!["Sales", "sale"]);
        assert_eq!(intent.record_kind.as_deref(), Some("sale.order"));
    }

    #[test]
    fn low_confidence_or_unmapped_guess_falls_back() {
        let oracle = ScriptedOracle::replying(guess("invoices", Some(0.1)));
        let parser = IntentParser::new(Some(&oracle), 0.3, 500);
        assert_eq!(parser.parse("open products").expect("intent").entity, "products");

        let oracle = ScriptedOracle::replying(guess("weather", Some(0.99)));
        let parser = IntentParser::new(Some(&oracle), 0.3, 500);
        assert_eq!(parser.parse("open products").expect("intent").entity, "products");
    }

    #[test]
    fn oracle_failure_falls_back() {
        let oracle = ScriptedOracle::failing(OracleError::Timeout(Duration::from_secs(30)));
        let parser = IntentParser::new(Some(&oracle), 0.3, 500);
        let intent = parser.parse("what's the weather").expect("intent");
        assert_eq!(intent, Intent::unknown("what's the weather"));
    }

    #[test]
    fn unmapped_fallback_entity_is_still_navigation() {
        let parser = IntentParser::new(None, 0.3, 500);
        let intent = parser.parse("open the timesheets page").expect("intent");
        assert_eq!(intent.kind, IntentKind::Navigation);
        assert_eq!(intent.entity, "timesheets");
        assert!(intent.navigation_targets.is_empty());
        assert_eq!(intent.record_kind, None);
    }
}

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;
use tracing::warn;

use crate::vocabulary::EntityMapper;

const PHRASE_TEMPLATES: [&str; 3] = [
    r"(?:go to|open|navigate to|show|get to|take me to|bring up) (?:the )?(.*?) (?:page|module|menu|screen)",
    r"(?:go to|open|navigate to|show|get to|take me to|bring up) (?:the )?(.*?)(?:$| page| module| screen)",
    r"(?:get|take) me to (.*?)(?:$| page| module| screen)",
];

static PHRASE_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn phrase_patterns() -> &'static [Regex] {
    PHRASE_PATTERNS.get_or_init(|| {
        PHRASE_TEMPLATES
            .iter()
            .filter_map(|template| match Regex::new(template) {
                Ok(pattern) => Some(pattern),
                Err(err) => {
                    warn!(template, error = %err, "skipping phrase template");
                    None
                }
            })
            .collect()
    })
}

/// Returns the candidate entity phrase, or an empty string when nothing is found.
///
/// The first phrase template that matches anywhere in the lower-cased input decides
/// tier one; an empty capture drops to the keyword scan.
pub fn extract_entity(text: &str) -> String {
    let normalized = text.trim().to_lowercase();
    if normalized.is_empty() {
        return String::new();
    }

    let captured = phrase_patterns()
        .iter()
        .find_map(|pattern| pattern.captures(&normalized))
        .and_then(|captures| captures.get(1))
        .map(|group| group.as_str().trim().to_string())
        .unwrap_or_default();
    if !captured.is_empty() {
        debug!(entity = %captured, "phrase template matched");
        return captured;
    }

    match EntityMapper::known_keys().find(|key| normalized.contains(key)) {
        Some(key) => {
            debug!(entity = key, "keyword scan matched");
            key.to_string()
        }
        None => String::new(),
    }
}

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

use serde_json::Value;

use crate::error::OracleError;
use crate::error::StoreError;
use crate::intent::IntentOracle;
use crate::intent::OracleGuess;
use crate::store::select;
use crate::store::Condition;
use crate::store::Record;
use crate::store::RecordStore;
use crate::store::SearchOptions;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub kind: String,
    pub conditions: Vec<Condition>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<String, Vec<Record>>,
    failing: BTreeSet<String>,
    panicking: BTreeSet<String>,
    queries: Mutex<Vec<RecordedQuery>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, kind: &str, records: Vec<Value>) -> Self {
        let decoded = records
            .into_iter()
            .filter_map(|record| match record {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        self.records.insert(kind.to_string(), decoded);
        self
    }

    pub fn failing_on(mut self, kind: &str) -> Self {
        self.failing.insert(kind.to_string());
        self
    }

    pub fn panicking_on(mut self, kind: &str) -> Self {
        self.panicking.insert(kind.to_string());
        self
    }

    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.queries
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }
}

impl RecordStore for MemoryStore {
    fn search_read(
        &self,
        kind: &str,
        conditions: &[Condition],
        options: &SearchOptions,
    ) -> Result<Vec<Record>, StoreError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(RecordedQuery {
                kind: kind.to_string(),
                conditions: conditions.to_vec(),
                limit: options.limit,
            });
        }
        if self.panicking.contains(kind) {
            panic!("memory store told to panic on {kind}");
        }
        if self.failing.contains(kind) {
            return Err(StoreError::Transport(format!("{kind} unavailable")));
        }
        let records = self.records.get(kind).map(Vec::as_slice).unwrap_or_default();
        Ok(select(records, conditions, options))
    }
}

#[derive(Debug)]
pub struct ScriptedOracle {
    reply: Result<OracleGuess, OracleError>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn replying(guess: OracleGuess) -> Self {
        Self {
            reply: Ok(guess),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: OracleError) -> Self {
        Self {
            reply: Err(err),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IntentOracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    fn extract_intent(&self, _text: &str) -> Result<OracleGuess, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }
}

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use odoonav_core::error::StoreError;
use odoonav_core::store::select;
use odoonav_core::store::Condition;
use odoonav_core::store::Record;
use odoonav_core::store::RecordStore;
use odoonav_core::store::SearchOptions;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fixture document: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_company_id() -> i64 {
    1
}

/// `{ "base_url", "company_id", "records": { kind: [record, ...] } }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureDocument {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_company_id")]
    pub company_id: i64,
    #[serde(default)]
    pub records: HashMap<String, Vec<Record>>,
}

#[derive(Debug, Clone, Default)]
pub struct FixtureStore {
    document: FixtureDocument,
}

impl FixtureStore {
    pub fn new(document: FixtureDocument) -> Self {
        Self { document }
    }

    pub fn from_json(text: &str) -> Result<Self, FixtureError> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn base_url(&self) -> Option<&str> {
        self.document.base_url.as_deref()
    }

    pub fn company_id(&self) -> i64 {
        self.document.company_id
    }
}

impl RecordStore for FixtureStore {
    fn search_read(
        &self,
        kind: &str,
        conditions: &[Condition],
        options: &SearchOptions,
    ) -> Result<Vec<Record>, StoreError> {
        let records = self.document.records.get(kind).into_iter().flatten();
        Ok(select(records, conditions, options))
    }
}

use std::cmp::Ordering;

use serde_json::Map;
use serde_json::Value;

use crate::error::StoreError;

pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    ILike,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::ILike => "ilike",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: Operator,
    pub value: Value,
}

impl Condition {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: Operator::Eq,
            value: value.into(),
        }
    }

    pub fn ilike(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: Operator::ILike,
            value: value.into(),
        }
    }

    /// In-memory evaluation with the store's semantics. A many-to-one pair compares
    /// equal to its id.
    pub fn matches(&self, record: &Record) -> bool {
        let Some(actual) = record.get(&self.field) else {
            return false;
        };
        match self.op {
            Operator::Eq => match (actual, &self.value) {
                (Value::Array(pair), Value::Number(_)) => pair.first() == Some(&self.value),
                (actual, wanted) => actual == wanted,
            },
            Operator::ILike => match (actual, &self.value) {
                (Value::String(text), Value::String(needle)) => {
                    text.to_lowercase().contains(&needle.to_lowercase())
                }
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub fields: Vec<String>,
    pub limit: Option<usize>,
    pub offset: usize,
    pub order: Option<String>,
}

impl SearchOptions {
    pub fn fields(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|field| field.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

pub trait RecordStore: Send + Sync {
    fn search_read(
        &self,
        kind: &str,
        conditions: &[Condition],
        options: &SearchOptions,
    ) -> Result<Vec<Record>, StoreError>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn search_read(
        &self,
        kind: &str,
        conditions: &[Condition],
        options: &SearchOptions,
    ) -> Result<Vec<Record>, StoreError> {
        (**self).search_read(kind, conditions, options)
    }
}

impl<S: RecordStore + ?Sized> RecordStore for std::sync::Arc<S> {
    fn search_read(
        &self,
        kind: &str,
        conditions: &[Condition],
        options: &SearchOptions,
    ) -> Result<Vec<Record>, StoreError> {
        (**self).search_read(kind, conditions, options)
    }
}

pub fn select<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    conditions: &[Condition],
    options: &SearchOptions,
) -> Vec<Record> {
    let mut hits: Vec<&Record> = records
        .into_iter()
        .filter(|record| conditions.iter().all(|condition| condition.matches(record)))
        .collect();
    if let Some((field, descending)) = options.order.as_deref().and_then(parse_order) {
        hits.sort_by(|a, b| {
            let ordering = compare_values(a.get(field), b.get(field));
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }
    hits.into_iter()
        .skip(options.offset)
        .take(options.limit.unwrap_or(usize::MAX))
        .map(|record| project(record, &options.fields))
        .collect()
}

fn parse_order(order: &str) -> Option<(&str, bool)> {
    let mut parts = order.split_whitespace();
    let field = parts.next()?;
    let descending = parts
        .next()
        .is_some_and(|direction| direction.eq_ignore_ascii_case("desc"));
    Some((field, descending))
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn project(record: &Record, fields: &[String]) -> Record {
    if fields.is_empty() {
        return record.clone();
    }
    fields
        .iter()
        .filter_map(|field| record.get(field).map(|value| (field.clone(), value.clone())))
        .collect()
}

pub fn text_field<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    match record.get(field) {
        Some(Value::String(text)) if !text.is_empty() => Some(text.as_str()),
        _ => None,
    }
}

pub fn int_field(record: &Record, field: &str) -> Option<i64> {
    match record.get(field) {
        Some(Value::Number(number)) => number.as_i64(),
        _ => None,
    }
}

/// Id of a many-to-one field, which arrives as `[id, display_name]` or a bare id.
pub fn many2one_id(record: &Record, field: &str) -> Option<i64> {
    match record.get(field) {
        Some(Value::Array(pair)) => pair.first().and_then(Value::as_i64),
        Some(Value::Number(number)) => number.as_i64(),
        _ => None,
    }
}

pub fn raw_field(record: &Record, field: &str) -> Value {
    match record.get(field) {
        None | Some(Value::Bool(false)) => Value::Null,
        Some(other) => other.clone(),
    }
}

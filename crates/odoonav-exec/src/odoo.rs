use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::json;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;
use tracing::info;
use tracing::warn;

use odoonav_core::error::StoreError;
use odoonav_core::store::many2one_id;
use odoonav_core::store::Condition;
use odoonav_core::store::Record;
use odoonav_core::store::RecordStore;
use odoonav_core::store::SearchOptions;

use crate::xmlrpc::decode_response;
use crate::xmlrpc::encode_call;

const USER_MODEL: &str = "res.users";

pub struct XmlRpcStore {
    client: Client,
    object_url: String,
    db: String,
    uid: i64,
    password: String,
}

impl fmt::Debug for XmlRpcStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlRpcStore")
            .field("object_url", &self.object_url)
            .field("db", &self.db)
            .field("uid", &self.uid)
            .finish_non_exhaustive()
    }
}

impl XmlRpcStore {
    /// Authenticates against `<base>/xmlrpc/2/common`. A `false` or non-positive uid
    /// is [`StoreError::Authentication`].
    pub fn connect(
        base_url: &str,
        db: &str,
        user: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| StoreError::Transport(format!("failed to build http client: {err}")))?;
        let base = base_url.trim_end_matches('/');
        let common_url = format!("{base}/xmlrpc/2/common");

        let reply = call(
            &client,
            &common_url,
            "authenticate",
            &[json!(db), json!(user), json!(password), json!({})],
        )?;
        let uid = reply
            .as_i64()
            .filter(|uid| *uid > 0)
            .ok_or_else(|| {
                StoreError::Authentication(format!("server rejected credentials for {user}@{db}"))
            })?;
        info!(uid, db, "authenticated against odoo");

        Ok(Self {
            client,
            object_url: format!("{base}/xmlrpc/2/object"),
            db: db.to_string(),
            uid,
            password: password.to_string(),
        })
    }

    pub fn current_company_id(&self, default: i64) -> i64 {
        let options = SearchOptions::fields(&["company_id"]).with_limit(1);
        match self.search_read(USER_MODEL, &[Condition::eq("id", self.uid)], &options) {
            Ok(rows) => rows
                .first()
                .and_then(|row| many2one_id(row, "company_id"))
                .unwrap_or(default),
            Err(err) => {
                warn!(error = %err, default, "could not read the user's company");
                default
            }
        }
    }

    fn execute_kw_params(
        &self,
        kind: &str,
        conditions: &[Condition],
        options: &SearchOptions,
    ) -> Vec<Value> {
        vec![
            json!(self.db),
            json!(self.uid),
            json!(self.password),
            json!(kind),
            json!("search_read"),
            json!([domain(conditions)]),
            Value::Object(keyword_arguments(options)),
        ]
    }
}

impl RecordStore for XmlRpcStore {
    fn search_read(
        &self,
        kind: &str,
        conditions: &[Condition],
        options: &SearchOptions,
    ) -> Result<Vec<Record>, StoreError> {
        let params = self.execute_kw_params(kind, conditions, options);
        match call(&self.client, &self.object_url, "execute_kw", &params)? {
            Value::Array(rows) => rows
                .into_iter()
                .map(|row| match row {
                    Value::Object(record) => Ok(record),
                    other => Err(StoreError::Decode(format!(
                        "search_read row is not a struct: {other}"
                    ))),
                })
                .collect(),
            other => Err(StoreError::Decode(format!(
                "search_read returned {other} instead of a list"
            ))),
        }
    }
}

fn domain(conditions: &[Condition]) -> Value {
    Value::Array(
        conditions
            .iter()
            .map(|condition| json!([condition.field, condition.op.as_str(), condition.value]))
            .collect(),
    )
}

fn keyword_arguments(options: &SearchOptions) -> Map<String, Value> {
    let mut kwargs = Map::new();
    kwargs.insert("fields".to_string(), json!(options.fields));
    kwargs.insert("offset".to_string(), json!(options.offset));
    if let Some(limit) = options.limit {
        kwargs.insert("limit".to_string(), json!(limit));
    }
    if let Some(order) = &options.order {
        kwargs.insert("order".to_string(), json!(order));
    }
    kwargs
}

fn call(client: &Client, url: &str, method: &str, params: &[Value]) -> Result<Value, StoreError> {
    debug!(url, method, "xml-rpc call");
    let response = client
        .post(url)
        .header(CONTENT_TYPE, "text/xml")
        .body(encode_call(method, params))
        .send()
        .map_err(|err| StoreError::Transport(err.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .map_err(|err| StoreError::Transport(err.to_string()))?;
    if !status.is_success() {
        let snippet: String = body.chars().take(200).collect();
        return Err(StoreError::Transport(format!("http {status}: {snippet}")));
    }
    decode_response(&body)
}

//! HTTP client for an OpenSearch compatible cluster
//!
//! Only the handful of endpoints the indexer needs are wrapped. Responses are
//! decoded into `serde_json::Value` except for bulk replies, which are typed.

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::SearchConfig;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search cluster replied {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode search response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl SearchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::Status { body, .. } if body.contains("resource_already_exists_exception"))
    }
}

pub type SearchResult<T> = Result<T, SearchError>;

/// One item of a bulk reply, keyed by its action name in [`BulkResponse`]
#[derive(Debug, Clone, Deserialize)]
pub struct BulkItem {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub status: u16,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkResponse {
    pub errors: bool,
    #[serde(default)]
    pub items: Vec<HashMap<String, BulkItem>>,
}

impl BulkResponse {
    /// Items that did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &BulkItem> {
        self.items
            .iter()
            .flat_map(|item| item.values())
            .filter(|item| item.status >= 300 || item.error.is_some())
    }
}

#[derive(Debug, Clone, Serialize)]
struct BulkAction<'a> {
    index: BulkTarget<'a>,
}

#[derive(Debug, Clone, Serialize)]
struct BulkTarget<'a> {
    #[serde(rename = "_index")]
    index: &'a str,
    #[serde(rename = "_id")]
    id: &'a str,
}

/// Append an index action and its document to an NDJSON bulk body.
pub fn push_bulk_index<T: Serialize>(body: &mut String, index: &str, id: &str, doc: &T) -> SearchResult<()> {
    body.push_str(&serde_json::to_string(&BulkAction {
        index: BulkTarget { index, id },
    })?);
    body.push('\n');
    body.push_str(&serde_json::to_string(doc)?);
    body.push('\n');
    Ok(())
}

#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl std::fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish()
    }
}

impl SearchClient {
    pub fn new(config: &SearchConfig) -> SearchResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("datapipe/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match &self.username {
            Some(user) => builder.basic_auth(user, self.password.as_deref()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> SearchResult<(StatusCode, String)> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    async fn send_ok(&self, builder: RequestBuilder) -> SearchResult<String> {
        let (status, body) = self.send(builder).await?;
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    /// Index names behind `alias`; empty when the alias does not exist.
    #[instrument(skip(self))]
    pub async fn get_alias(&self, alias: &str) -> SearchResult<Vec<String>> {
        let (status, body) = self.send(self.request(Method::GET, &format!("/_alias/{}", alias))).await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: HashMap<String, Value> = serde_json::from_str(&body)?;
        let mut indices: Vec<String> = value.into_keys().collect();
        indices.sort();
        Ok(indices)
    }

    /// The `mappings` section of `index`.
    #[instrument(skip(self))]
    pub async fn get_mapping(&self, index: &str) -> SearchResult<Value> {
        let body = self.send_ok(self.request(Method::GET, &format!("/{}/_mapping", index))).await?;
        let value: Value = serde_json::from_str(&body)?;
        Ok(value
            .get(index)
            .and_then(|v| v.get("mappings"))
            .cloned()
            .unwrap_or(Value::Null))
    }

    #[instrument(skip(self, body))]
    pub async fn create_index(&self, index: &str, body: &Value) -> SearchResult<()> {
        self.send_ok(self.request(Method::PUT, &format!("/{}", index)).json(body)).await?;
        debug!(index, "Index created");
        Ok(())
    }

    /// Names of indices matching `pattern`.
    #[instrument(skip(self))]
    pub async fn cat_indices(&self, pattern: &str) -> SearchResult<Vec<String>> {
        let (status, body) = self
            .send(self.request(Method::GET, &format!("/_cat/indices/{}?format=json", pattern)))
            .await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<Value> = serde_json::from_str(&body)?;
        let mut names: Vec<String> = rows
            .iter()
            .filter_map(|row| row.get("index").and_then(Value::as_str).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    #[instrument(skip(self))]
    pub async fn delete_index(&self, index: &str) -> SearchResult<()> {
        self.send_ok(self.request(Method::DELETE, &format!("/{}", index))).await?;
        Ok(())
    }

    /// Apply alias actions atomically.
    #[instrument(skip(self, actions))]
    pub async fn update_aliases(&self, actions: Vec<Value>) -> SearchResult<()> {
        self.send_ok(
            self.request(Method::POST, "/_aliases")
                .json(&json!({ "actions": actions })),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, body), fields(bytes = body.len()))]
    pub async fn bulk(&self, body: String) -> SearchResult<BulkResponse> {
        let body = self
            .send_ok(
                self.request(Method::POST, "/_bulk")
                    .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
                    .body(body),
            )
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    #[instrument(skip(self, doc))]
    pub async fn put_document<T: Serialize + Sync>(&self, index: &str, id: &str, doc: &T) -> SearchResult<()> {
        self.send_ok(self.request(Method::PUT, &format!("/{}/_doc/{}", index, id)).json(doc))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, query))]
    pub async fn search(&self, index: &str, query: &Value) -> SearchResult<Value> {
        let body = self
            .send_ok(self.request(Method::POST, &format!("/{}/_search", index)).json(query))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_push_bulk_index() {
        let mut body = String::new();
        push_bulk_index(&mut body, "addresses_1", "abc", &json!({"fips": "06037"})).unwrap();

        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        let action: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(action["index"]["_index"], "addresses_1");
        assert_eq!(action["index"]["_id"], "abc");
        assert!(body.ends_with('\n'));
    }

    #[test]
    fn test_bulk_failures() {
        let response: BulkResponse = serde_json::from_value(json!({
            "errors": true,
            "items": [
                {"index": {"_id": "1", "status": 201}},
                {"index": {"_id": "2", "status": 429, "error": {"type": "es_rejected_execution_exception"}}}
            ]
        }))
        .unwrap();

        let failures: Vec<_> = response.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].id.as_deref(), Some("2"));
    }

    #[test]
    fn test_error_classification() {
        let limited = SearchError::Status {
            status: 429,
            body: String::new(),
        };
        assert!(limited.is_rate_limited());

        let exists = SearchError::Status {
            status: 400,
            body: r#"{"error":{"type":"resource_already_exists_exception"}}"#.to_string(),
        };
        assert!(exists.is_already_exists());
        assert!(!exists.is_rate_limited());
    }
}

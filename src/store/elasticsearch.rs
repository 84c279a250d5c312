//! Elasticsearch document store over its JSON/HTTP API

use crate::search::{QuerySpec, SearchError, SearchResult};
use crate::store::{
    BulkItemResult, BulkOperation, BulkResponse, DocumentStore, RawHit, SearchHits, SuggestOption,
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const SUGGESTER_NAME: &str = "course-suggest";

/// Elasticsearch client
#[derive(Clone)]
pub struct ElasticsearchStore {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct EsBulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<HashMap<String, EsBulkItem>>,
}

#[derive(Debug, Deserialize)]
struct EsBulkItem {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    status: u16,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct EsSearchResponse {
    #[serde(default)]
    hits: Option<EsHits>,
    #[serde(default)]
    suggest: Option<HashMap<String, Vec<EsSuggestEntry>>>,
}

#[derive(Debug, Deserialize)]
struct EsHits {
    #[serde(default)]
    total: Option<EsTotal>,
    #[serde(default)]
    hits: Vec<EsHit>,
}

/// Elasticsearch 7+ reports `{"value": n}`, 6.x a bare number
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EsTotal {
    Object { value: u64 },
    Count(u64),
}

#[derive(Debug, Deserialize)]
struct EsHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct EsSuggestEntry {
    #[serde(default)]
    options: Vec<EsSuggestOption>,
}

#[derive(Debug, Deserialize)]
struct EsSuggestOption {
    text: String,
}

impl ElasticsearchStore {
    /// Create a client for the cluster at `base_url` with a per-request timeout
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> SearchResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            SearchError::InvalidConfiguration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Map a non-success status to the error taxonomy
    async fn check(response: Response) -> SearchResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::BAD_REQUEST => SearchError::MalformedQuery(body),
            StatusCode::NOT_FOUND => SearchError::IndexNotFound(body),
            _ => SearchError::StoreUnavailable(format!("HTTP {}: {}", status.as_u16(), body)),
        })
    }

    async fn post_search(&self, index: &str, body: &Value) -> SearchResult<EsSearchResponse> {
        let response = self
            .client
            .post(self.url(&format!("{}/_search", index)))
            .json(body)
            .send()
            .await?;

        let response = Self::check(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl DocumentStore for ElasticsearchStore {
    async fn exists(&self, index: &str) -> SearchResult<bool> {
        let response = self.client.head(self.url(index)).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(SearchError::StoreUnavailable(format!(
                "HTTP {} checking index {}",
                status.as_u16(),
                index
            ))),
        }
    }

    async fn create_index(&self, index: &str, mapping: &Value) -> SearchResult<()> {
        let response = self.client.put(self.url(index)).json(mapping).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SearchError::IndexCreationFailed(format!(
            "HTTP {}: {}",
            status.as_u16(),
            body
        )))
    }

    async fn bulk_write(
        &self,
        index: &str,
        operations: Vec<BulkOperation>,
    ) -> SearchResult<BulkResponse> {
        let mut body = String::new();
        for operation in &operations {
            match operation {
                BulkOperation::Index { id, document } => {
                    let action = json!({ "index": { "_index": index, "_id": id } });
                    body.push_str(&serde_json::to_string(&action)?);
                    body.push('\n');
                    body.push_str(&serde_json::to_string(document)?);
                    body.push('\n');
                }
            }
        }

        debug!(index = %index, operations = operations.len(), "Submitting bulk request");

        let response = self
            .client
            .post(self.url(&format!("{}/_bulk?refresh=true", index)))
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await?;

        let response = Self::check(response).await?;
        let bytes = response.bytes().await?;
        let parsed: EsBulkResponse = serde_json::from_slice(&bytes)?;

        let items = parsed
            .items
            .into_iter()
            .zip(operations.iter())
            .filter_map(|(mut item, operation)| {
                item.drain().next().map(|(_, result)| BulkItemResult {
                    id: result.id.unwrap_or_else(|| operation.id().to_string()),
                    status: result.status,
                    error: result.error.map(|e| {
                        e.get("reason")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                            .unwrap_or_else(|| e.to_string())
                    }),
                })
            })
            .collect();

        Ok(BulkResponse {
            errors: parsed.errors,
            items,
        })
    }

    async fn search(&self, index: &str, query: &QuerySpec) -> SearchResult<SearchHits> {
        let parsed = self.post_search(index, &query.to_dsl()).await?;

        let hits = parsed.hits.ok_or_else(|| {
            SearchError::Deserialization("search response has no 'hits' section".to_string())
        })?;

        Ok(SearchHits {
            total: hits.total.map(|t| match t {
                EsTotal::Object { value } => value,
                EsTotal::Count(count) => count,
            }),
            hits: hits
                .hits
                .into_iter()
                .map(|h| RawHit {
                    id: h.id,
                    source: h.source,
                })
                .collect(),
        })
    }

    async fn suggest(
        &self,
        index: &str,
        field: &str,
        prefix: &str,
        size: usize,
    ) -> SearchResult<Vec<SuggestOption>> {
        let mut suggest = Map::new();
        suggest.insert(
            SUGGESTER_NAME.to_string(),
            json!({
                "prefix": prefix,
                "completion": {
                    "field": field,
                    "skip_duplicates": true,
                    "size": size
                }
            }),
        );
        let body = json!({ "_source": false, "suggest": suggest });

        let parsed = self.post_search(index, &body).await?;

        Ok(parsed
            .suggest
            .and_then(|mut s| s.remove(SUGGESTER_NAME))
            .unwrap_or_default()
            .into_iter()
            .flat_map(|entry| entry.options)
            .map(|option| SuggestOption { text: option.text })
            .collect())
    }
}

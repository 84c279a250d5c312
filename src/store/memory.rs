//! Embedded document store evaluating `QuerySpec` in process

use crate::search::{
    Fuzziness, QueryClause, QuerySpec, RangeValue, SearchError, SearchResult, SortOrder, SortSpec,
};
use crate::store::{
    BulkItemResult, BulkOperation, BulkResponse, DocumentStore, RawHit, SearchHits, SuggestOption,
};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

#[derive(Debug, Default)]
struct MemoryIndex {
    mapping: Value,
    /// Documents in first-write order
    documents: Vec<(String, Value)>,
}

/// In-memory document store (for development and testing)
#[derive(Clone, Default)]
pub struct InMemoryStore {
    indices: Arc<RwLock<HashMap<String, MemoryIndex>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents held by an index
    pub fn document_count(&self, index: &str) -> usize {
        self.indices
            .read()
            .get(index)
            .map(|i| i.documents.len())
            .unwrap_or(0)
    }

    /// Mapping the index was created with (`Null` when auto-created)
    pub fn mapping(&self, index: &str) -> Option<Value> {
        self.indices.read().get(index).map(|i| i.mapping.clone())
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn exists(&self, index: &str) -> SearchResult<bool> {
        Ok(self.indices.read().contains_key(index))
    }

    async fn create_index(&self, index: &str, mapping: &Value) -> SearchResult<()> {
        let mut indices = self.indices.write();
        if indices.contains_key(index) {
            return Err(SearchError::IndexCreationFailed(format!(
                "index [{}] already exists",
                index
            )));
        }

        indices.insert(
            index.to_string(),
            MemoryIndex {
                mapping: mapping.clone(),
                documents: Vec::new(),
            },
        );
        tracing::debug!(index = %index, "Index created");
        Ok(())
    }

    async fn bulk_write(
        &self,
        index: &str,
        operations: Vec<BulkOperation>,
    ) -> SearchResult<BulkResponse> {
        let mut indices = self.indices.write();
        let target = indices.entry(index.to_string()).or_default();
        let mut items = Vec::with_capacity(operations.len());

        for operation in operations {
            match operation {
                BulkOperation::Index { id, document } => {
                    if !document.is_object() {
                        items.push(BulkItemResult {
                            id,
                            status: 400,
                            error: Some("document source must be a JSON object".to_string()),
                        });
                        continue;
                    }

                    let position = target.documents.iter().position(|(doc_id, _)| *doc_id == id);
                    let status = match position {
                        Some(pos) => {
                            target.documents[pos].1 = document;
                            200
                        }
                        None => {
                            target.documents.push((id.clone(), document));
                            201
                        }
                    };

                    items.push(BulkItemResult {
                        id,
                        status,
                        error: None,
                    });
                }
            }
        }

        Ok(BulkResponse {
            errors: items.iter().any(|i| !i.is_success()),
            items,
        })
    }

    async fn search(&self, index: &str, query: &QuerySpec) -> SearchResult<SearchHits> {
        let indices = self.indices.read();
        let target = indices
            .get(index)
            .ok_or_else(|| SearchError::IndexNotFound(index.to_string()))?;

        let mut matched: Vec<&(String, Value)> = target
            .documents
            .iter()
            .filter(|(_, doc)| matches(&query.query, doc))
            .collect();

        let total = matched.len() as u64;

        if !query.sort.is_empty() {
            matched.sort_by(|(_, a), (_, b)| compare_documents(a, b, &query.sort));
        }

        let hits = matched
            .into_iter()
            .skip(query.from)
            .take(query.size)
            .map(|(id, doc)| RawHit {
                id: id.clone(),
                source: Some(project(doc, query.source_includes.as_deref())),
            })
            .collect();

        Ok(SearchHits {
            hits,
            total: Some(total),
        })
    }

    async fn suggest(
        &self,
        index: &str,
        field: &str,
        prefix: &str,
        size: usize,
    ) -> SearchResult<Vec<SuggestOption>> {
        let indices = self.indices.read();
        let target = indices
            .get(index)
            .ok_or_else(|| SearchError::IndexNotFound(index.to_string()))?;

        let prefix = prefix.to_lowercase();
        let completions: BTreeSet<String> = target
            .documents
            .iter()
            .flat_map(|(_, doc)| completion_inputs(doc, field))
            .filter(|input| input.to_lowercase().starts_with(&prefix))
            .collect();

        Ok(completions
            .into_iter()
            .take(size)
            .map(|text| SuggestOption { text })
            .collect())
    }
}

/// Resolve a field path; `x.keyword` falls back to the raw `x` value
fn lookup<'a>(doc: &'a Value, field: &str) -> Option<&'a Value> {
    doc.get(field)
        .or_else(|| field.strip_suffix(".keyword").and_then(|f| doc.get(f)))
        .filter(|v| !v.is_null())
}

fn matches(clause: &QueryClause, doc: &Value) -> bool {
    match clause {
        QueryClause::MatchAll => true,
        QueryClause::MultiMatch {
            query,
            fields,
            fuzziness,
        } => {
            let terms = tokenize(query);
            fields.iter().any(|field| {
                lookup(doc, &field.name)
                    .and_then(Value::as_str)
                    .map(|text| {
                        let tokens = tokenize(text);
                        terms
                            .iter()
                            .any(|term| tokens.iter().any(|token| fuzzy_eq(term, token, *fuzziness)))
                    })
                    .unwrap_or(false)
            })
        }
        QueryClause::Term { field, value } => match lookup(doc, field) {
            Some(Value::String(s)) => s == value,
            Some(other) => other.to_string() == *value,
            None => false,
        },
        QueryClause::Range { field, gte, lte } => {
            let Some(actual) = lookup(doc, field) else {
                return false;
            };
            let lower_ok = gte.as_ref().map_or(true, |bound| {
                matches!(
                    compare_to_bound(actual, bound),
                    Some(Ordering::Greater | Ordering::Equal)
                )
            });
            let upper_ok = lte.as_ref().map_or(true, |bound| {
                matches!(
                    compare_to_bound(actual, bound),
                    Some(Ordering::Less | Ordering::Equal)
                )
            });
            lower_ok && upper_ok
        }
        QueryClause::Prefix {
            field,
            value,
            case_insensitive,
        } => match lookup(doc, field).and_then(Value::as_str) {
            Some(text) if *case_insensitive => text.to_lowercase().starts_with(&value.to_lowercase()),
            Some(text) => text.starts_with(value.as_str()),
            None => false,
        },
        QueryClause::Bool(b) => {
            b.must.iter().all(|c| matches(c, doc)) && b.filter.iter().all(|c| matches(c, doc))
        }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn fuzzy_eq(term: &str, token: &str, fuzziness: Fuzziness) -> bool {
    let max_edits = fuzziness.max_edits(term.chars().count());
    strsim::levenshtein(term, token) <= max_edits
}

fn parse_date(value: &Value) -> Option<DateTime<FixedOffset>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}

fn compare_to_bound(actual: &Value, bound: &RangeValue) -> Option<Ordering> {
    match bound {
        RangeValue::Integer(b) => actual.as_f64()?.partial_cmp(&(*b as f64)),
        RangeValue::Float(b) => actual.as_f64()?.partial_cmp(b),
        RangeValue::Date(b) => Some(parse_date(actual)?.cmp(b)),
    }
}

#[derive(Debug, PartialEq, PartialOrd)]
enum SortKey {
    Number(f64),
    Date(DateTime<FixedOffset>),
    Text(String),
}

fn sort_key(doc: &Value, field: &str) -> Option<SortKey> {
    let value = lookup(doc, field)?;
    if let Some(n) = value.as_f64() {
        return Some(SortKey::Number(n));
    }
    if let Some(date) = parse_date(value) {
        return Some(SortKey::Date(date));
    }
    value.as_str().map(|s| SortKey::Text(s.to_string()))
}

/// Documents missing the sort field go last in either direction
fn compare_documents(a: &Value, b: &Value, sort: &[SortSpec]) -> Ordering {
    for spec in sort {
        let ordering = match (sort_key(a, &spec.field), sort_key(b, &spec.field)) {
            (Some(x), Some(y)) => {
                let ordering = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
                match spec.order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn project(doc: &Value, includes: Option<&[String]>) -> Value {
    match (includes, doc.as_object()) {
        (Some(includes), Some(object)) => {
            let projected: Map<String, Value> = object
                .iter()
                .filter(|(key, _)| includes.iter().any(|i| i == *key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            Value::Object(projected)
        }
        _ => doc.clone(),
    }
}

/// Completion inputs accept `{"input": [...]}`, `{"input": "..."}`, `[...]` or `"..."`
fn completion_inputs(doc: &Value, field: &str) -> Vec<String> {
    let Some(value) = lookup(doc, field) else {
        return Vec::new();
    };
    let input = value.get("input").unwrap_or(value);

    match input {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

//! Title autocompletion

use crate::metrics;
use crate::search::config::{SuggestStrategy, MAX_SUGGESTIONS};
use crate::search::error::SearchResult;
use crate::search::query::QueryBuilder;
use crate::search::schema::fields;
use crate::store::DocumentStore;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

/// Produces deduplicated title completions for a partial title
pub struct SuggestionEngine {
    store: Arc<dyn DocumentStore>,
    index_name: String,
    strategy: SuggestStrategy,
    limit: usize,
    builder: QueryBuilder,
}

impl SuggestionEngine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        index_name: impl Into<String>,
        strategy: SuggestStrategy,
        limit: usize,
    ) -> Self {
        Self {
            store,
            index_name: index_name.into(),
            strategy,
            limit: limit.clamp(1, MAX_SUGGESTIONS),
            builder: QueryBuilder::new(),
        }
    }

    /// Suggest titles completing `partial`.
    ///
    /// Blank input issues no request. Store failures yield an empty list.
    pub async fn suggest(&self, partial: &str) -> Vec<String> {
        let prefix = partial.trim();
        if prefix.is_empty() {
            return Vec::new();
        }

        let started = Instant::now();
        let result = match self.strategy {
            SuggestStrategy::Completion => self.complete(prefix).await,
            SuggestStrategy::Prefix => self.prefix_match(prefix).await,
        };

        match result {
            Ok(titles) => {
                let outcome = if titles.is_empty() { "empty" } else { "success" };
                metrics::record_operation("suggest", outcome, started);
                titles
            }
            Err(e) => {
                error!(
                    operation = "suggest",
                    index = %self.index_name,
                    strategy = ?self.strategy,
                    q = %prefix,
                    error = %e,
                    "Suggestion failed, returning no suggestions"
                );
                metrics::record_operation("suggest", "degraded", started);
                Vec::new()
            }
        }
    }

    async fn complete(&self, prefix: &str) -> SearchResult<Vec<String>> {
        let options = self
            .store
            .suggest(&self.index_name, fields::SUGGEST, prefix, self.limit)
            .await?;

        Ok(dedup_titles(options.into_iter().map(|o| o.text), self.limit))
    }

    async fn prefix_match(&self, prefix: &str) -> SearchResult<Vec<String>> {
        let spec = self.builder.title_prefix(prefix, self.limit);
        let hits = self.store.search(&self.index_name, &spec).await?;

        let titles = hits.hits.into_iter().filter_map(|hit| {
            hit.source
                .as_ref()
                .and_then(|s| s.get(fields::TITLE))
                .and_then(Value::as_str)
                .map(str::to_string)
        });

        Ok(dedup_titles(titles, self.limit))
    }
}

/// Drop blanks and repeats, keep first-seen order, cap at `limit`
fn dedup_titles(titles: impl IntoIterator<Item = String>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    titles
        .into_iter()
        .filter(|t| !t.trim().is_empty())
        .filter(|t| seen.insert(t.clone()))
        .take(limit)
        .collect()
}

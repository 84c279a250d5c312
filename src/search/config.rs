//! Search configuration

use serde::{Deserialize, Serialize};

/// Hard cap on suggestions returned per request
pub const MAX_SUGGESTIONS: usize = 10;

/// How title suggestions are produced
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SuggestStrategy {
    /// Completion suggester over the derived `suggest` field
    #[default]
    Completion,
    /// Prefix query over the unanalyzed title
    Prefix,
}

/// Search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Index shared by bootstrap, search, suggestion and indexing
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Suggestion strategy
    #[serde(default)]
    pub suggest_strategy: SuggestStrategy,

    /// Maximum suggestions per request (capped at 10)
    #[serde(default = "default_suggest_limit")]
    pub suggest_limit: usize,
}

impl SearchConfig {
    /// Suggestion limit after applying the hard cap
    pub fn effective_suggest_limit(&self) -> usize {
        self.suggest_limit.clamp(1, MAX_SUGGESTIONS)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_name: default_index_name(),
            suggest_strategy: SuggestStrategy::default(),
            suggest_limit: default_suggest_limit(),
        }
    }
}

fn default_index_name() -> String {
    "courses".to_string()
}

fn default_suggest_limit() -> usize {
    MAX_SUGGESTIONS
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.config.index_name = name.into();
        self
    }

    pub fn suggest_strategy(mut self, strategy: SuggestStrategy) -> Self {
        self.config.suggest_strategy = strategy;
        self
    }

    pub fn suggest_limit(mut self, limit: usize) -> Self {
        self.config.suggest_limit = limit;
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

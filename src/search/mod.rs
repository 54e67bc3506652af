pub mod engine;
pub mod highlight;
pub mod matcher;
pub mod normalize;
pub mod score;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::model::Role;

/// Which fields take part in a search, plus an optional message role filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchOptions {
    pub search_titles: bool,
    pub search_messages: bool,
    pub search_tags: bool,
    /// Restricts message matches to one role. Title and tag matches ignore it.
    pub role_filter: Option<Role>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            search_titles: true,
            search_messages: true,
            search_tags: true,
            role_filter: None,
        }
    }
}

impl SearchOptions {
    /// True when at least one field is enabled.
    pub fn has_scope(&self) -> bool {
        self.search_titles || self.search_messages || self.search_tags
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMatchType {
    Title,
    Message,
    Tag,
}

/// A single field of a conversation in which the query was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    pub conversation_id: String,
    pub conversation_title: String,
    /// Set only for message matches.
    pub message_id: Option<String>,
    pub message_role: Option<Role>,
    pub match_type: SearchMatchType,
    /// Excerpt with the matched span wrapped in `<mark>`/`</mark>`.
    pub highlighted_snippet: String,
    /// 0..=100, ordering only.
    pub relevance_score: f64,
    /// Unix seconds: message `createdAt`, or conversation `updatedAt`.
    pub timestamp: i64,
}

/// Ranked, truncated matches for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    query: String,
    matches: Vec<SearchMatch>,
    total_matches: usize,
    search_duration: Duration,
    cancelled: bool,
}

impl SearchResults {
    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            matches: vec![],
            total_matches: 0,
            search_duration: Duration::ZERO,
            cancelled: false,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    /// Number of matches before truncation to the page size.
    pub fn total_matches(&self) -> usize {
        self.total_matches
    }

    pub fn search_duration(&self) -> Duration {
        self.search_duration
    }

    /// True when the scan stopped early on a cancellation request.
    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    /// Number of matches actually returned.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

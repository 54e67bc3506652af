use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::config::EngineConfig;
use crate::model::Conversation;

use super::highlight::snippet;
use super::matcher::{match_conversation, FieldMatch};
use super::normalize::normalize;
use super::score::score;
use super::{SearchMatch, SearchMatchType, SearchOptions, SearchResults};

/// In-memory search over a caller-supplied list of conversations.
/// Holds only configuration; nothing is carried between searches.
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    config: EngineConfig,
}

impl SearchEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Search using the system clock for recency scoring.
    pub fn search(
        &self,
        conversations: &[Conversation],
        query: &str,
        options: &SearchOptions,
    ) -> SearchResults {
        self.run(conversations, query, options, unix_now(), None)
    }

    /// Search with an explicit "now" in Unix seconds.
    pub fn search_at(
        &self,
        conversations: &[Conversation],
        query: &str,
        options: &SearchOptions,
        now: i64,
    ) -> SearchResults {
        self.run(conversations, query, options, now, None)
    }

    /// Like [`search`](Self::search), but checks `cancel` between conversations
    /// and returns whatever was found so far once it is raised.
    pub fn search_cancellable(
        &self,
        conversations: &[Conversation],
        query: &str,
        options: &SearchOptions,
        cancel: &AtomicBool,
    ) -> SearchResults {
        self.run(conversations, query, options, unix_now(), Some(cancel))
    }

    fn run(
        &self,
        conversations: &[Conversation],
        query: &str,
        options: &SearchOptions,
        now: i64,
        cancel: Option<&AtomicBool>,
    ) -> SearchResults {
        let started = Instant::now();
        let normalized = normalize(query);

        if normalized.is_empty() || !options.has_scope() {
            let mut results = SearchResults::empty(query);
            results.search_duration = started.elapsed();
            return results;
        }

        let (mut matches, cancelled) = scan_isolated(conversations, cancel, |conversation| {
            self.conversation_matches(conversation, &normalized, options, now)
        });

        // Stable sort keeps encounter order among full ties.
        matches.sort_by(|a, b| {
            b.relevance_score
                .total_cmp(&a.relevance_score)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });

        let total_matches = matches.len();
        matches.truncate(self.config.page_size);
        let search_duration = started.elapsed();

        log::debug!(
            "Search {:?}: {} of {} matches in {:?}{}",
            normalized,
            matches.len(),
            total_matches,
            search_duration,
            if cancelled { " (cancelled)" } else { "" }
        );

        SearchResults {
            query: query.to_string(),
            matches,
            total_matches,
            search_duration,
            cancelled,
        }
    }

    fn conversation_matches(
        &self,
        conversation: &Conversation,
        query: &str,
        options: &SearchOptions,
        now: i64,
    ) -> Vec<SearchMatch> {
        match_conversation(conversation, query, options)
            .into_iter()
            .map(|field| self.build_match(conversation, &field, now))
            .collect()
    }

    fn build_match(&self, conversation: &Conversation, field: &FieldMatch, now: i64) -> SearchMatch {
        let timestamp = match (field.match_type, field.message) {
            (SearchMatchType::Message, Some(msg)) => msg.created_at,
            _ => conversation.updated_at,
        };

        SearchMatch {
            conversation_id: conversation.id.clone(),
            conversation_title: conversation.title.clone(),
            message_id: field.message.map(|m| m.id.clone()),
            message_role: field.message.map(|m| m.role),
            match_type: field.match_type,
            highlighted_snippet: snippet(field.text, field.span, self.config.snippet_window),
            relevance_score: score(field, timestamp, now, self.config.recency_window_days),
            timestamp,
        }
    }
}

/// Run `scan` over every conversation until `cancel` is raised. A conversation
/// whose scan panics is logged and contributes nothing; the rest still run.
fn scan_isolated<F>(
    conversations: &[Conversation],
    cancel: Option<&AtomicBool>,
    scan: F,
) -> (Vec<SearchMatch>, bool)
where
    F: Fn(&Conversation) -> Vec<SearchMatch>,
{
    let mut matches = Vec::new();

    for conversation in conversations {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return (matches, true);
        }

        match panic::catch_unwind(AssertUnwindSafe(|| scan(conversation))) {
            Ok(found) => matches.extend(found),
            Err(_) => {
                log::warn!(
                    "Skipping conversation {}: matching panicked",
                    conversation.id
                );
            }
        }
    }

    (matches, false)
}

/// Search with the default configuration.
pub fn search(conversations: &[Conversation], query: &str, options: &SearchOptions) -> SearchResults {
    SearchEngine::default().search(conversations, query, options)
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Message, Role};
    use crate::search::highlight::{MARK_CLOSE, MARK_OPEN};

    const NOW: i64 = 1_700_000_000;
    const DAY: i64 = 86_400;

    fn engine() -> SearchEngine {
        crate::logging::init_test();
        SearchEngine::default()
    }

    fn rust_conversation() -> Conversation {
        Conversation::new("c1", "Rust ownership", NOW - DAY)
            .with_tags(&["rust"])
            .with_message(Message::new(
                "m1",
                Role::User,
                "I love Rust and ownership semantics",
                NOW - DAY,
            ))
    }

    #[test]
    fn test_search_three_field_types() {
        let convs = vec![rust_conversation()];
        let results = engine().search_at(&convs, "rust", &SearchOptions::default(), NOW);

        assert_eq!(results.len(), 3);
        assert_eq!(results.total_matches(), 3);
        assert!(results.search_duration() < std::time::Duration::from_secs(5));
        assert_eq!(results.matches()[0].match_type, SearchMatchType::Title);
        let mut types: Vec<_> = results.matches().iter().map(|m| m.match_type).collect();
        types.sort_by_key(|t| *t as u8);
        assert_eq!(
            types,
            vec![SearchMatchType::Title, SearchMatchType::Message, SearchMatchType::Tag]
        );
    }

    #[test]
    fn test_message_match_fields() {
        let convs = vec![rust_conversation()];
        let results = engine().search_at(&convs, "semantics", &SearchOptions::default(), NOW);
        assert_eq!(results.len(), 1);
        let m = &results.matches()[0];
        assert_eq!(m.message_id.as_deref(), Some("m1"));
        assert_eq!(m.message_role, Some(Role::User));
        assert_eq!(m.conversation_title, "Rust ownership");
        assert_eq!(m.timestamp, NOW - DAY);
        assert_eq!(
            m.highlighted_snippet,
            format!("I love Rust and ownership {}semantics{}", MARK_OPEN, MARK_CLOSE)
        );
    }

    #[test]
    fn test_empty_query() {
        let convs = vec![rust_conversation()];
        for q in ["", "   ", "\t\n"] {
            let results = engine().search_at(&convs, q, &SearchOptions::default(), NOW);
            assert_eq!(results.total_matches(), 0);
            assert_eq!(results.len(), 0);
        }
    }

    #[test]
    fn test_no_scope_returns_empty() {
        let convs = vec![rust_conversation()];
        let opts = SearchOptions {
            search_titles: false,
            search_messages: false,
            search_tags: false,
            role_filter: None,
        };
        let results = engine().search_at(&convs, "rust", &opts, NOW);
        assert!(results.is_empty());
        assert_eq!(results.total_matches(), 0);
    }

    #[test]
    fn test_query_is_trimmed_and_case_folded() {
        let convs = vec![rust_conversation()];
        let results = engine().search_at(&convs, "  OWNERSHIP ", &SearchOptions::default(), NOW);
        assert_eq!(results.len(), 2);
        assert_eq!(results.query(), "  OWNERSHIP ");
    }

    #[test]
    fn test_ties_broken_by_recency_then_order() {
        let convs = vec![
            Conversation::new("old", "deploy notes", NOW - 30 * DAY),
            Conversation::new("new", "deploy notes", NOW - 20 * DAY),
            Conversation::new("new2", "deploy notes", NOW - 20 * DAY),
        ];
        let results = engine().search_at(&convs, "deploy", &SearchOptions::default(), NOW);
        let ids: Vec<_> = results
            .matches()
            .iter()
            .map(|m| m.conversation_id.as_str())
            .collect();
        assert_eq!(ids, vec!["new", "new2", "old"]);
    }

    #[test]
    fn test_truncated_to_page_size() {
        let convs: Vec<Conversation> = (0..60)
            .map(|i| Conversation::new(&format!("c{}", i), "topic", NOW).with_tags(&["topic"]))
            .collect();
        let results = engine().search_at(&convs, "topic", &SearchOptions::default(), NOW);
        assert_eq!(results.total_matches(), 120);
        assert_eq!(results.len(), 50);
    }

    #[test]
    fn test_custom_page_size() {
        let convs: Vec<Conversation> = (0..5)
            .map(|i| Conversation::new(&format!("c{}", i), "topic", NOW))
            .collect();
        let engine = SearchEngine::new(EngineConfig {
            page_size: 2,
            ..EngineConfig::default()
        });
        assert_eq!(engine.config().page_size, 2);
        let results = engine.search_at(&convs, "topic", &SearchOptions::default(), NOW);
        assert_eq!(results.len(), 2);
        assert_eq!(results.total_matches(), 5);
    }

    #[test]
    fn test_cancel_before_start() {
        let convs = vec![rust_conversation()];
        let cancel = AtomicBool::new(true);
        let results = engine().search_cancellable(&convs, "rust", &SearchOptions::default(), &cancel);
        assert!(results.cancelled());
        assert!(results.is_empty());
    }

    #[test]
    fn test_not_cancelled() {
        let convs = vec![rust_conversation()];
        let cancel = AtomicBool::new(false);
        let results = engine().search_cancellable(&convs, "rust", &SearchOptions::default(), &cancel);
        assert!(!results.cancelled());
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_panicking_conversation_skipped() {
        let engine = engine();
        let convs = vec![
            Conversation::new("c1", "rust one", NOW),
            Conversation::new("broken", "rust two", NOW),
            Conversation::new("c3", "rust three", NOW),
        ];
        let opts = SearchOptions::default();

        let (matches, cancelled) = scan_isolated(&convs, None, |conv| {
            if conv.id == "broken" {
                panic!("bad conversation");
            }
            engine.conversation_matches(conv, "rust", &opts, NOW)
        });

        assert!(!cancelled);
        let ids: Vec<_> = matches.iter().map(|m| m.conversation_id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c3"]);
    }

    #[test]
    fn test_scan_stops_when_cancelled_midway() {
        let convs: Vec<Conversation> = (0..5)
            .map(|i| Conversation::new(&format!("c{}", i), "rust", NOW))
            .collect();
        let engine = engine();
        let cancel = AtomicBool::new(false);
        let opts = SearchOptions::default();

        let (matches, cancelled) = scan_isolated(&convs, Some(&cancel), |conv| {
            if conv.id == "c1" {
                cancel.store(true, Ordering::Relaxed);
            }
            engine.conversation_matches(conv, "rust", &opts, NOW)
        });

        assert!(cancelled);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_free_function_uses_defaults() {
        let convs = vec![rust_conversation()];
        let results = search(&convs, "rust", &SearchOptions::default());
        assert_eq!(results.len(), 3);
    }
}

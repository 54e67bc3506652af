use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::model::Conversation;
use crate::search::engine::SearchEngine;
use crate::search::{SearchOptions, SearchResults};

/// Token identifying one search within a session.
#[derive(Debug, Clone)]
pub struct Generation {
    id: u64,
    cancel: Arc<AtomicBool>,
}

impl Generation {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

/// Search-as-you-type driver: each new query supersedes the one in flight.
/// Responses from a superseded query are dropped instead of published.
pub struct SearchSession {
    engine: SearchEngine,
    generation: AtomicU64,
    in_flight: Mutex<Arc<AtomicBool>>,
}

impl SearchSession {
    pub fn new(engine: SearchEngine) -> Self {
        Self {
            engine,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(Arc::new(AtomicBool::new(false))),
        }
    }

    /// Start a new generation and cancel the previous one.
    pub fn begin(&self) -> Generation {
        let cancel = Arc::new(AtomicBool::new(false));
        // Id and cancel flag change under one lock, so the newest id always
        // owns the only uncancelled flag.
        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *slot, Arc::clone(&cancel));
        previous.store(true, Ordering::Relaxed);
        let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        drop(slot);

        Generation { id, cancel }
    }

    pub fn is_current(&self, generation: &Generation) -> bool {
        self.generation.load(Ordering::SeqCst) == generation.id
    }

    /// Run a query as the newest generation. `None` means a newer query
    /// superseded this one before it finished.
    pub async fn run(
        &self,
        conversations: Arc<Vec<Conversation>>,
        query: String,
        options: SearchOptions,
    ) -> Option<SearchResults> {
        let generation = self.begin();
        self.run_generation(generation, conversations, query, options)
            .await
    }

    /// Run a query under a generation obtained from [`begin`](Self::begin).
    pub async fn run_generation(
        &self,
        generation: Generation,
        conversations: Arc<Vec<Conversation>>,
        query: String,
        options: SearchOptions,
    ) -> Option<SearchResults> {
        let engine = self.engine.clone();
        let cancel = Arc::clone(&generation.cancel);

        let joined = tokio::task::spawn_blocking(move || {
            engine.search_cancellable(&conversations, &query, &options, &cancel)
        })
        .await;

        let results = match joined {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Search task failed: {}", e);
                return None;
            }
        };

        if results.cancelled() || !self.is_current(&generation) {
            log::debug!("Dropping stale results for generation {}", generation.id);
            return None;
        }
        Some(results)
    }
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(SearchEngine::default())
    }
}

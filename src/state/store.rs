//! Crawl state persistence
//!
//! A traversal's progress (its visited set and pending queue) can outlive
//! one process invocation. The scheduler owns the lifecycle: it loads state
//! at traversal start and saves at traversal end; nothing else touches the
//! store mid-traversal.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from loading or saving crawl state
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Bad crawl state payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One traversal's persisted progress
///
/// `pending` holds `(url, depth)` tasks in queue order, including tasks
/// deferred past the depth ceiling so a later invocation with a higher
/// `max_depth` can pick them up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCrawlState {
    pub visited: Vec<String>,
    pub pending: Vec<(String, u32)>,
}

impl PersistedCrawlState {
    /// Returns true if there is nothing to resume
    pub fn is_empty(&self) -> bool {
        self.visited.is_empty() && self.pending.is_empty()
    }
}

/// Storage for per-scraper crawl state, keyed by scraper identity
pub trait StateStore {
    /// Loads the state for `identity`, if any was saved
    fn load(&mut self, identity: &str) -> Result<Option<PersistedCrawlState>, StateError>;

    /// Saves the state for `identity`, replacing any previous save
    fn save(&mut self, identity: &str, state: &PersistedCrawlState) -> Result<(), StateError>;

    /// Removes the state for `identity`
    fn clear(&mut self, identity: &str) -> Result<(), StateError>;
}

impl<S: StateStore + ?Sized> StateStore for Box<S> {
    fn load(&mut self, identity: &str) -> Result<Option<PersistedCrawlState>, StateError> {
        (**self).load(identity)
    }

    fn save(&mut self, identity: &str, state: &PersistedCrawlState) -> Result<(), StateError> {
        (**self).save(identity, state)
    }

    fn clear(&mut self, identity: &str) -> Result<(), StateError> {
        (**self).clear(identity)
    }
}

/// Discards everything; traversals always start from their seeds
#[derive(Debug, Default)]
pub struct NullStateStore;

impl StateStore for NullStateStore {
    fn load(&mut self, _identity: &str) -> Result<Option<PersistedCrawlState>, StateError> {
        Ok(None)
    }

    fn save(&mut self, _identity: &str, _state: &PersistedCrawlState) -> Result<(), StateError> {
        Ok(())
    }

    fn clear(&mut self, _identity: &str) -> Result<(), StateError> {
        Ok(())
    }
}

/// In-memory store, for tests and single-process multi-run setups
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    states: HashMap<String, PersistedCrawlState>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&mut self, identity: &str) -> Result<Option<PersistedCrawlState>, StateError> {
        Ok(self.states.get(identity).cloned())
    }

    fn save(&mut self, identity: &str, state: &PersistedCrawlState) -> Result<(), StateError> {
        self.states.insert(identity.to_string(), state.clone());
        Ok(())
    }

    fn clear(&mut self, identity: &str) -> Result<(), StateError> {
        self.states.remove(identity);
        Ok(())
    }
}

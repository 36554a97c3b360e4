//! Crawl state persistence
//!
//! Lets a crawl resume where it left off across separate invocations: one
//! persisted record per scraper identity, holding the visited URL set and
//! the pending `(url, depth)` queue.

mod sqlite;
mod store;

pub use sqlite::SqliteStateStore;
pub use store::{MemoryStateStore, NullStateStore, PersistedCrawlState, StateError, StateStore};

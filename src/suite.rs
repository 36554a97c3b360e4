//! Suite and scraper definitions
//!
//! A run is an ordered list of suites; a suite is an ordered group of
//! scrapers sharing a config layer; a scraper is one crawl-and-extract
//! unit: seed URLs, a scrape function, and its own config layer. All of
//! these are built before a run starts and are immutable while it runs.

use crate::browser::PageView;
use crate::config::ConfigLayer;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;

/// A record emitted by a scrape function: any JSON-representable value
///
/// Object key order is preserved end to end.
pub type Record = Value;

/// Completion handle for asynchronous scrape functions
///
/// An async scrape function receives one of these per page and resolves it
/// with the page's records when its work is done. Dropping the handle
/// without resolving counts as a timeout for that page.
pub struct Completion {
    tx: oneshot::Sender<Record>,
}

impl Completion {
    pub(crate) fn new(tx: oneshot::Sender<Record>) -> Self {
        Self { tx }
    }

    /// Resolves the page's scrape with its records
    pub fn resolve(self, value: Record) {
        // The receiver is gone once the page timed out; nothing to do then
        let _ = self.tx.send(value);
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Completion")
    }
}

/// A scrape function, synchronous or completion-signalled
///
/// Both styles are driven through the same completion contract by the page
/// session: a synchronous function resolves immediately, an asynchronous
/// one resolves whenever it signals, and the session waits on one future
/// with one timeout either way.
#[derive(Clone)]
pub enum ScrapeFn {
    /// Returns the page's records directly
    Sync(Arc<dyn Fn(&PageView) -> Record + Send + Sync>),

    /// Completes via the [`Completion`] signal
    Async(Arc<dyn Fn(PageView, Completion) + Send + Sync>),
}

impl ScrapeFn {
    /// Wraps a synchronous scrape function
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&PageView) -> Record + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(f))
    }

    /// Wraps a completion-signalled scrape function
    pub fn asynchronous<F>(f: F) -> Self
    where
        F: Fn(PageView, Completion) + Send + Sync + 'static,
    {
        Self::Async(Arc::new(f))
    }

    /// Selector shorthand: the text of every element matching `selector`
    /// becomes one record
    pub fn selector(selector: &str) -> Self {
        let selector = selector.to_string();
        Self::sync(move |page| {
            Value::Array(
                page.select_text(&selector)
                    .into_iter()
                    .map(Value::String)
                    .collect(),
            )
        })
    }

    /// Returns true if this function completes via an explicit signal
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }
}

impl fmt::Debug for ScrapeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("ScrapeFn::Sync"),
            Self::Async(_) => f.write_str("ScrapeFn::Async"),
        }
    }
}

/// Flattens a scrape function's return value into records
///
/// An array yields one record per element, `null` yields none, and any
/// other value is a single record.
pub(crate) fn into_records(value: Record) -> Vec<Record> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// One crawl-and-extract unit
#[derive(Debug)]
pub struct Scraper {
    /// Name used in logs, error context, and state-store identity
    pub name: String,

    /// Seed URLs, visited in declared order at depth 0
    pub urls: Vec<String>,

    /// The scrape function
    pub scrape: ScrapeFn,

    /// The scraper config layer (highest precedence)
    pub config: ConfigLayer,
}

impl Scraper {
    pub fn new(name: &str, urls: Vec<String>, scrape: ScrapeFn) -> Self {
        Self {
            name: name.to_string(),
            urls,
            scrape,
            config: ConfigLayer::default(),
        }
    }

    /// Single-URL convenience constructor
    pub fn single(name: &str, url: &str, scrape: ScrapeFn) -> Self {
        Self::new(name, vec![url.to_string()], scrape)
    }

    pub fn with_config(mut self, config: ConfigLayer) -> Self {
        self.config = config;
        self
    }
}

/// An ordered group of scrapers sharing a config layer
#[derive(Debug, Default)]
pub struct Suite {
    pub title: String,
    pub config: ConfigLayer,
    pub scrapers: Vec<Scraper>,
}

impl Suite {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn with_config(mut self, config: ConfigLayer) -> Self {
        self.config = config;
        self
    }

    pub fn add_scraper(mut self, scraper: Scraper) -> Self {
        self.scrapers.push(scraper);
        self
    }
}

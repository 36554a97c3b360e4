use crate::browser::PageView;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Predicate polled after navigation to decide when a page is safe to scrape
pub type ReadyPredicate = Arc<dyn Fn(&PageView) -> bool + Send + Sync>;

/// Predicate deciding whether a visited page emits records
pub type ScrapablePredicate = Arc<dyn Fn(&PageView) -> bool + Send + Sync>;

/// Hook run against the page view before the scrape function executes
pub type PreScrapeHook = Arc<dyn Fn(&mut PageView) + Send + Sync>;

/// One layer of the configuration cascade
///
/// Every option is optional; unset keys fall through to the next-lower
/// layer during resolution. Layers deserialize from the TOML run file;
/// the predicate and hook fields can only be supplied programmatically.
/// Unrecognized keys are carried in `extra` rather than rejected.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    /// Traversal depth ceiling; seeds are depth 0
    pub max_depth: Option<u32>,

    /// Total page-visit bound for one traversal
    pub max_visits: Option<u64>,

    /// CSS selector choosing which links to follow when recursing
    pub selector: Option<String>,

    /// Recurse over all anchor links when no `selector` is set
    pub follow_links: Option<bool>,

    /// Allow a URL to be visited more than once in a traversal
    pub allow_repeat: Option<bool>,

    /// Ceiling for the ready poll, in milliseconds
    pub ready_timeout_ms: Option<u64>,

    /// Interval between ready polls, in milliseconds
    pub poll_interval_ms: Option<u64>,

    /// The scrape function completes via an explicit signal
    #[serde(rename = "async")]
    pub async_scrape: Option<bool>,

    /// Ceiling for the completion signal, in milliseconds
    pub async_timeout_ms: Option<u64>,

    /// Pause between page visits, in milliseconds
    pub delay_ms: Option<u64>,

    /// Output serialization: "json" or "csv"
    pub format: Option<String>,

    /// Explicit CSV field list, declared order
    pub fields: Option<Vec<String>>,

    /// Derive CSV fields from the first record
    pub auto_fields: Option<bool>,

    /// Suppress duplicate records
    pub ignore_duplicates: Option<bool>,

    /// Record field used as the dedup key; absent means structural equality
    pub id_field: Option<String>,

    #[serde(skip)]
    pub ready: Option<ReadyPredicate>,

    #[serde(skip)]
    pub scrapable: Option<ScrapablePredicate>,

    #[serde(skip)]
    pub pre_scrape: Option<PreScrapeHook>,

    /// Unrecognized keys, passed through opaquely
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ConfigLayer {
    /// Creates an empty layer; every key falls through
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the readiness predicate for this layer
    pub fn ready<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&PageView) -> bool + Send + Sync + 'static,
    {
        self.ready = Some(Arc::new(predicate));
        self
    }

    /// Sets the scrapable predicate for this layer
    pub fn scrapable<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&PageView) -> bool + Send + Sync + 'static,
    {
        self.scrapable = Some(Arc::new(predicate));
        self
    }

    /// Sets the pre-scrape hook for this layer
    pub fn pre_scrape<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut PageView) + Send + Sync + 'static,
    {
        self.pre_scrape = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLayer")
            .field("max_depth", &self.max_depth)
            .field("max_visits", &self.max_visits)
            .field("selector", &self.selector)
            .field("follow_links", &self.follow_links)
            .field("allow_repeat", &self.allow_repeat)
            .field("ready_timeout_ms", &self.ready_timeout_ms)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("async_scrape", &self.async_scrape)
            .field("async_timeout_ms", &self.async_timeout_ms)
            .field("delay_ms", &self.delay_ms)
            .field("format", &self.format)
            .field("fields", &self.fields)
            .field("auto_fields", &self.auto_fields)
            .field("ignore_duplicates", &self.ignore_duplicates)
            .field("id_field", &self.id_field)
            .field("ready", &self.ready.as_ref().map(|_| "<predicate>"))
            .field("scrapable", &self.scrapable.as_ref().map(|_| "<predicate>"))
            .field("pre_scrape", &self.pre_scrape.as_ref().map(|_| "<hook>"))
            .field("extra", &self.extra)
            .finish()
    }
}

/// The resolved, fully-defaulted configuration for one scraper
///
/// Fixed for the duration of that scraper's traversal.
#[derive(Clone)]
pub struct EffectiveConfig {
    pub max_depth: Option<u32>,
    pub max_visits: Option<u64>,
    pub selector: Option<String>,
    pub follow_links: bool,
    pub allow_repeat: bool,
    pub ready: Option<ReadyPredicate>,
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
    pub async_scrape: bool,
    pub async_timeout: Duration,
    pub delay: Duration,
    pub scrapable: Option<ScrapablePredicate>,
    pub pre_scrape: Option<PreScrapeHook>,
    pub format: String,
    pub fields: Option<Vec<String>>,
    pub auto_fields: bool,
    pub ignore_duplicates: bool,
    pub id_field: Option<String>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EffectiveConfig {
    /// Returns true if discovered links should be followed
    pub fn recursive(&self) -> bool {
        self.selector.is_some() || self.follow_links
    }
}

impl fmt::Debug for EffectiveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectiveConfig")
            .field("max_depth", &self.max_depth)
            .field("max_visits", &self.max_visits)
            .field("selector", &self.selector)
            .field("follow_links", &self.follow_links)
            .field("allow_repeat", &self.allow_repeat)
            .field("ready", &self.ready.as_ref().map(|_| "<predicate>"))
            .field("ready_timeout", &self.ready_timeout)
            .field("poll_interval", &self.poll_interval)
            .field("async_scrape", &self.async_scrape)
            .field("async_timeout", &self.async_timeout)
            .field("delay", &self.delay)
            .field("scrapable", &self.scrapable.as_ref().map(|_| "<predicate>"))
            .field("pre_scrape", &self.pre_scrape.as_ref().map(|_| "<hook>"))
            .field("format", &self.format)
            .field("fields", &self.fields)
            .field("auto_fields", &self.auto_fields)
            .field("ignore_duplicates", &self.ignore_duplicates)
            .field("id_field", &self.id_field)
            .field("extra", &self.extra)
            .finish()
    }
}

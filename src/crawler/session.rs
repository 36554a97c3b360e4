//! Page session coordination
//!
//! Drives a single page through its lifecycle:
//! navigate, wait for readiness, run the pre-scrape hook, gate on the
//! scrapable predicate, execute the scrape function, discover links.
//! Every wait is timeout-bounded, and every failure is absorbed into a
//! typed outcome; a page can never take the surrounding traversal down.

use crate::browser::{PageDriver, PageView};
use crate::config::{EffectiveConfig, ReadyPredicate};
use crate::suite::{into_records, Completion, Record, ScrapeFn};
use std::fmt;
use std::time::Instant;
use tokio::sync::oneshot;
use url::Url;

/// Why a page was visited but contributed no records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The scrapable predicate declined the page
    NotScrapable,

    /// The async completion signal never arrived in time
    AsyncTimeout,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotScrapable => f.write_str("page not scrapable"),
            Self::AsyncTimeout => f.write_str("async scrape timed out"),
        }
    }
}

/// The result of driving one page
#[derive(Debug)]
pub enum PageOutcome {
    /// The page was scraped; records are in emission order, links in
    /// document order
    Scraped {
        records: Vec<Record>,
        links: Vec<Url>,
    },

    /// The page was visited but suppressed; links are still followed
    Skipped {
        reason: SkipReason,
        links: Vec<Url>,
    },

    /// Navigation failed; the page contributes nothing
    Failed { reason: String },
}

/// Visits one page under the given effective configuration
pub async fn visit<D: PageDriver + ?Sized>(
    driver: &D,
    url: &Url,
    config: &EffectiveConfig,
    scrape: &ScrapeFn,
) -> PageOutcome {
    let mut page = match driver.navigate(url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::error!("{}", e);
            return PageOutcome::Failed {
                reason: e.to_string(),
            };
        }
    };

    tracing::debug!("Scraping {}", url);

    if let Some(ready) = &config.ready {
        wait_for_ready(&page, ready, config).await;
    }

    if let Some(hook) = &config.pre_scrape {
        hook(&mut page);
    }

    // Link discovery happens regardless of the scrapable gate so recursion
    // can continue through pages that emit nothing themselves
    let links = if config.recursive() {
        page.links(config.selector.as_deref())
    } else {
        Vec::new()
    };

    if let Some(scrapable) = &config.scrapable {
        if !scrapable(&page) {
            tracing::debug!("Suppressing records for {}", url);
            return PageOutcome::Skipped {
                reason: SkipReason::NotScrapable,
                links,
            };
        }
    }

    // Unified completion contract: a synchronous function resolves its
    // signal immediately, an asynchronous one whenever it finishes, and
    // the wait below is the same for both
    let (tx, rx) = oneshot::channel();
    match scrape {
        ScrapeFn::Sync(f) => {
            let _ = tx.send(f(&page));
        }
        ScrapeFn::Async(f) => f(page, Completion::new(tx)),
    }

    match tokio::time::timeout(config.async_timeout, rx).await {
        Ok(Ok(value)) => PageOutcome::Scraped {
            records: into_records(value),
            links,
        },
        Ok(Err(_)) => {
            tracing::warn!(
                "Scrape function dropped its completion handle without resolving: {}",
                url
            );
            PageOutcome::Skipped {
                reason: SkipReason::AsyncTimeout,
                links,
            }
        }
        Err(_) => {
            tracing::warn!(
                "Timeout after {:?} waiting for async scrape: {}",
                config.async_timeout,
                url
            );
            PageOutcome::Skipped {
                reason: SkipReason::AsyncTimeout,
                links,
            }
        }
    }
}

/// Polls the readiness predicate until it passes or the timeout elapses
///
/// A timeout is best-effort, not a failure: the page is scraped anyway.
async fn wait_for_ready(page: &PageView, ready: &ReadyPredicate, config: &EffectiveConfig) {
    let start = Instant::now();
    loop {
        if ready(page) {
            return;
        }
        if start.elapsed() >= config.ready_timeout {
            tracing::warn!(
                "Timeout after {:?} waiting for page to become ready: {}",
                config.ready_timeout,
                page.url()
            );
            return;
        }
        tokio::time::sleep(config.poll_interval).await;
    }
}

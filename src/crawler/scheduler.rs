//! Crawl scheduling
//!
//! Expands a scraper's seed URLs into a breadth-first traversal over
//! `(url, depth)` tasks. The frontier is an explicit worklist (cyclic link
//! graphs would overflow call-stack recursion), loop avoidance is a
//! visited-set consulted when tasks are dequeued, and depth bounding
//! defers tasks past the ceiling instead of dropping them so a persisted
//! crawl can pick them up in a later invocation.
//!
//! With `allow_repeat` set, the visited-set is not consulted and a cyclic
//! graph without `max_depth` or `max_visits` will not terminate; bounding
//! such a traversal is the caller's responsibility.

use crate::aggregate::ResultAggregator;
use crate::browser::PageDriver;
use crate::config::EffectiveConfig;
use crate::crawler::session::{self, PageOutcome};
use crate::state::{PersistedCrawlState, StateStore};
use crate::suite::Scraper;
use crate::Result;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// One unit of traversal work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: String,
    pub depth: u32,
}

/// Breadth-first traversal of one scraper's link graph
pub struct CrawlScheduler<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
    config: &'a EffectiveConfig,
    frontier: VecDeque<CrawlTask>,
    visited: HashSet<String>,
    deferred: Vec<CrawlTask>,
    visits: u64,
}

impl<'a, D: PageDriver + ?Sized> CrawlScheduler<'a, D> {
    pub fn new(driver: &'a D, config: &'a EffectiveConfig) -> Self {
        Self {
            driver,
            config,
            frontier: VecDeque::new(),
            visited: HashSet::new(),
            deferred: Vec::new(),
            visits: 0,
        }
    }

    /// Runs the traversal, streaming records into the aggregator
    ///
    /// Loads persisted state for `identity` before the first visit (a
    /// pending queue from a previous invocation replaces the seeds) and
    /// saves the remaining queue and visited set after the last one.
    pub async fn run(
        &mut self,
        scraper: &Scraper,
        identity: &str,
        store: &mut dyn StateStore,
        aggregator: &mut ResultAggregator,
    ) -> Result<()> {
        match store.load(identity)? {
            Some(state) if !state.is_empty() => {
                tracing::info!(
                    "Resuming traversal for {}: {} pending, {} visited",
                    identity,
                    state.pending.len(),
                    state.visited.len()
                );
                self.frontier = state
                    .pending
                    .into_iter()
                    .map(|(url, depth)| CrawlTask { url, depth })
                    .collect();
                self.visited = state.visited.into_iter().collect();
            }
            _ => {
                for url in &scraper.urls {
                    self.frontier.push_back(CrawlTask {
                        url: url.clone(),
                        depth: 0,
                    });
                }
            }
        }

        while let Some(task) = self.frontier.pop_front() {
            // Depth-bounded tasks are never visited, but they stay around
            // for persistence
            if let Some(max_depth) = self.config.max_depth {
                if task.depth > max_depth {
                    self.deferred.push(task);
                    continue;
                }
            }

            // Loop avoidance; the queue may hold duplicates discovered
            // before their first dequeue
            if !self.config.allow_repeat && self.visited.contains(&task.url) {
                continue;
            }

            if let Some(max_visits) = self.config.max_visits {
                if self.visits >= max_visits {
                    tracing::info!("Visit bound of {} reached, stopping traversal", max_visits);
                    self.frontier.push_front(task);
                    break;
                }
            }

            let url = match Url::parse(&task.url) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Skipping malformed URL {}: {}", task.url, e);
                    continue;
                }
            };

            self.visited.insert(task.url.clone());
            self.visits += 1;

            if !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }

            tracing::debug!("Opening {}", url);
            let outcome = session::visit(self.driver, &url, self.config, &scraper.scrape).await;

            let links = match outcome {
                PageOutcome::Scraped { records, links } => {
                    for record in records {
                        aggregator.push(record, self.config);
                    }
                    links
                }
                PageOutcome::Skipped { reason, links } => {
                    tracing::debug!("Visited {} without records: {}", url, reason);
                    links
                }
                // Already logged by the session; the page contributes
                // no records and no links
                PageOutcome::Failed { .. } => Vec::new(),
            };

            if !links.is_empty() {
                tracing::info!("Found {} additional urls to scrape", links.len());
                for link in links {
                    self.enqueue(link.to_string(), task.depth + 1);
                }
            }
        }

        let mut pending: Vec<(String, u32)> = self
            .frontier
            .drain(..)
            .chain(self.deferred.drain(..))
            .map(|task| (task.url, task.depth))
            .collect();
        pending.dedup();

        let mut visited: Vec<String> = self.visited.iter().cloned().collect();
        visited.sort();

        store.save(identity, &PersistedCrawlState { visited, pending })?;
        Ok(())
    }

    fn enqueue(&mut self, url: String, depth: u32) {
        if let Some(max_depth) = self.config.max_depth {
            if depth > max_depth {
                self.deferred.push(CrawlTask { url, depth });
                return;
            }
        }
        if !self.config.allow_repeat && self.visited.contains(&url) {
            return;
        }
        self.frontier.push_back(CrawlTask { url, depth });
    }
}

//! Run orchestration
//!
//! Iterates suites in declared order and scrapers in declared order within
//! each suite, resolving every scraper's config cascade up front so that a
//! configuration error aborts the run before any page is visited. Records
//! stream from each traversal into one aggregator whose seen-set spans the
//! whole run.

use crate::aggregate::ResultAggregator;
use crate::browser::PageDriver;
use crate::config::{resolve, ConfigLayer, EffectiveConfig};
use crate::crawler::scheduler::CrawlScheduler;
use crate::state::StateStore;
use crate::suite::{Record, Suite};
use crate::Result;

/// Drives a whole run: suites, scrapers, traversals, aggregation
pub struct Orchestrator<D: PageDriver, S: StateStore> {
    suites: Vec<Suite>,
    global: ConfigLayer,
    driver: D,
    store: S,
}

impl<D: PageDriver, S: StateStore> Orchestrator<D, S> {
    pub fn new(suites: Vec<Suite>, global: ConfigLayer, driver: D, store: S) -> Self {
        Self {
            suites,
            global,
            driver,
            store,
        }
    }

    /// Runs every suite and returns the final ordered record sequence
    pub async fn run(&mut self) -> Result<Vec<Record>> {
        // Resolve all configs first; a bad layer anywhere fails the run
        // before any navigation begins
        let mut resolved = Vec::with_capacity(self.suites.len());
        for suite in &self.suites {
            let mut suite_configs = Vec::with_capacity(suite.scrapers.len());
            for scraper in &suite.scrapers {
                let context = format!("{}/{}", suite.title, scraper.name);
                suite_configs.push(resolve(
                    &self.global,
                    &suite.config,
                    &scraper.config,
                    Some(scraper.scrape.is_async()),
                    &context,
                )?);
            }
            resolved.push(suite_configs);
        }

        let mut aggregator = ResultAggregator::new();

        for (suite, configs) in self.suites.iter().zip(&resolved) {
            tracing::info!("{} starting", suite.title);
            for (scraper, config) in suite.scrapers.iter().zip(configs) {
                let identity = format!("{}/{}", suite.title, scraper.name);
                let mut scheduler = CrawlScheduler::new(&self.driver, config);
                scheduler
                    .run(scraper, &identity, &mut self.store, &mut aggregator)
                    .await?;
            }
            tracing::info!("{} complete", suite.title);
        }

        let records = aggregator.into_records();
        tracing::info!("Collected {} items", records.len());
        Ok(records)
    }

    /// Resolves the output-facing options (format, fields) from the global
    /// layer alone; one run produces one output stream
    pub fn output_config(&self) -> Result<EffectiveConfig> {
        let empty = ConfigLayer::new();
        Ok(resolve(&self.global, &empty, &empty, None, "output")?)
    }
}

/// Runs an ordered list of suites under a global config
///
/// Convenience wrapper around [`Orchestrator`] for callers that do not
/// need to hold on to the driver or store afterwards.
pub async fn run_suites<D: PageDriver, S: StateStore>(
    suites: Vec<Suite>,
    global: ConfigLayer,
    driver: D,
    store: S,
) -> Result<Vec<Record>> {
    Orchestrator::new(suites, global, driver, store).run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fixtures::{html_page, StaticDriver};
    use crate::state::NullStateStore;
    use crate::suite::{ScrapeFn, Scraper};
    use crate::{ConfigError, HarvestError};
    use serde_json::json;

    fn driver() -> StaticDriver {
        StaticDriver::new()
            .page("http://test.local/a.html", &html_page("A", &[]))
            .page("http://test.local/b.html", &html_page("B", &[]))
            .page("http://test.local/c.html", &html_page("C", &[]))
    }

    fn title_scraper(name: &str, url: &str) -> Scraper {
        Scraper::single(
            name,
            url,
            ScrapeFn::sync(|page| json!(page.title().unwrap_or_default())),
        )
    }

    #[tokio::test]
    async fn test_suites_run_in_declared_order() {
        let suites = vec![
            Suite::new("one")
                .add_scraper(title_scraper("s1", "http://test.local/b.html"))
                .add_scraper(title_scraper("s2", "http://test.local/a.html")),
            Suite::new("two").add_scraper(title_scraper("s1", "http://test.local/c.html")),
        ];

        let records = run_suites(suites, ConfigLayer::new(), driver(), NullStateStore)
            .await
            .unwrap();

        assert_eq!(records, vec![json!("B"), json!("A"), json!("C")]);
    }

    #[tokio::test]
    async fn test_config_error_aborts_before_any_navigation() {
        // the second scraper's selector is invalid; the first must not run
        let suites = vec![Suite::new("one")
            .add_scraper(title_scraper("good", "http://test.local/a.html"))
            .add_scraper(
                title_scraper("bad", "http://test.local/b.html").with_config(ConfigLayer {
                    selector: Some(":::broken".to_string()),
                    ..Default::default()
                }),
            )];

        let driver = driver();
        let result = run_suites(suites, ConfigLayer::new(), driver, NullStateStore).await;

        match result {
            Err(HarvestError::Config(ConfigError::InvalidSelector { context, .. })) => {
                assert_eq!(context, "one/bad");
            }
            other => panic!("expected InvalidSelector, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_dedup_seen_set_spans_suites() {
        let global = ConfigLayer {
            ignore_duplicates: Some(true),
            ..Default::default()
        };
        let suites = vec![
            Suite::new("one").add_scraper(title_scraper("s", "http://test.local/a.html")),
            Suite::new("two").add_scraper(title_scraper("s", "http://test.local/a.html")),
        ];

        let records = run_suites(suites, global, driver(), NullStateStore)
            .await
            .unwrap();

        assert_eq!(records, vec![json!("A")]);
    }

    #[tokio::test]
    async fn test_output_config_uses_global_layer() {
        let global = ConfigLayer {
            format: Some("csv".to_string()),
            fields: Some(vec!["a".to_string()]),
            ..Default::default()
        };
        let orchestrator =
            Orchestrator::new(Vec::new(), global, driver(), NullStateStore);

        let config = orchestrator.output_config().unwrap();
        assert_eq!(config.format, "csv");
        assert_eq!(config.fields, Some(vec!["a".to_string()]));
    }
}

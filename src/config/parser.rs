//! Run file loading
//!
//! The CLI declares a run as a TOML file: one global config layer, optional
//! output/state settings, and a list of suites whose scrapers extract text
//! by CSS selector. Programmatic callers build [`Suite`] values directly and
//! never go through this module.

use crate::config::types::ConfigLayer;
use crate::suite::{ScrapeFn, Scraper, Suite};
use crate::ConfigError;
use scraper::Selector;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;

/// A parsed run file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RunFile {
    /// The global config layer
    pub config: ConfigLayer,

    /// Where the serialized output goes
    pub output: Option<OutputSettings>,

    /// Where crawl state persists between invocations
    pub state: Option<StateSettings>,

    #[serde(rename = "suite")]
    pub suites: Vec<SuiteDef>,
}

/// Output sink settings
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Output file path; stdout when absent
    pub path: Option<String>,
}

/// Crawl state persistence settings
#[derive(Debug, Deserialize)]
pub struct StateSettings {
    /// Path to the SQLite state database
    pub path: String,
}

/// A suite as declared in the run file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SuiteDef {
    pub title: Option<String>,

    /// The suite config layer
    pub config: ConfigLayer,

    #[serde(rename = "scraper")]
    pub scrapers: Vec<ScraperDef>,
}

/// A scraper as declared in the run file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScraperDef {
    pub name: Option<String>,

    /// Single seed URL shorthand
    pub url: Option<String>,

    /// Seed URLs, visited in declared order
    pub urls: Vec<String>,

    /// CSS selector; each matching element's text becomes one record
    pub scrape: String,

    /// The scraper config layer
    pub config: ConfigLayer,
}

/// Loads and parses a run file
pub fn load_run_file(path: &Path) -> Result<RunFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let run: RunFile = toml::from_str(&content)?;
    Ok(run)
}

/// Computes a SHA-256 hash of the run file content
///
/// Used to tell whether the run declaration changed between invocations
/// that share a persisted crawl state.
pub fn compute_run_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Builds runnable suites from a parsed run file
///
/// Untitled suites and unnamed scrapers get positional names ("Suite 0",
/// "scraper-1", ...). Every declared scrape selector is validated here so a
/// bad run file fails before any page is visited.
pub fn build_suites(run: &RunFile) -> Result<Vec<Suite>, ConfigError> {
    let mut suites = Vec::with_capacity(run.suites.len());

    for (si, suite_def) in run.suites.iter().enumerate() {
        let title = suite_def
            .title
            .clone()
            .unwrap_or_else(|| format!("Suite {}", si));

        let mut suite = Suite::new(&title).with_config(suite_def.config.clone());

        for (ci, scraper_def) in suite_def.scrapers.iter().enumerate() {
            let name = scraper_def
                .name
                .clone()
                .unwrap_or_else(|| format!("scraper-{}", ci));
            let context = format!("{}/{}", title, name);

            let mut urls = scraper_def.urls.clone();
            if let Some(url) = &scraper_def.url {
                urls.insert(0, url.clone());
            }
            if urls.is_empty() {
                return Err(ConfigError::Validation {
                    context,
                    message: "scraper declares no seed URLs".to_string(),
                });
            }

            if Selector::parse(&scraper_def.scrape).is_err() {
                return Err(ConfigError::InvalidSelector {
                    context,
                    selector: scraper_def.scrape.clone(),
                });
            }

            let scraper = Scraper::new(&name, urls, ScrapeFn::selector(&scraper_def.scrape))
                .with_config(scraper_def.config.clone());
            suite = suite.add_scraper(scraper);
        }

        suites.push(suite);
    }

    Ok(suites)
}

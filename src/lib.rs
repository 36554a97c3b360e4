//! Harvestman: a scraping and crawling orchestrator
//!
//! This crate drives a page automation layer to extract structured records
//! from one or more web pages, optionally following links recursively, and
//! emits the aggregated records as JSON or delimited text.
//!
//! Work is declared as suites of scrapers. Each scraper has seed URLs, a
//! scrape function (synchronous or completion-signalled), and a config layer
//! resolved through the cascade `defaults < global < suite < scraper`.

pub mod aggregate;
pub mod browser;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod suite;

use thiserror::Error;

/// Main error type for harvestman operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] output::SerializationError),

    #[error("Crawl state error: {0}")]
    State(#[from] state::StateError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// These are fatal: they are raised while resolving the config cascade,
/// before any page is visited. Every variant names the suite/scraper it
/// belongs to so a bad run file is diagnosable without re-running.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read run file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration for {context}: {message}")]
    Validation { context: String, message: String },

    #[error("Invalid CSS selector '{selector}' for {context}")]
    InvalidSelector { context: String, selector: String },

    #[error("{context}: `async` is set but the scrape function has no completion contract")]
    MissingCompletionContract { context: String },

    #[error("{context}: the scrape function signals completion but `async` is not set")]
    UnexpectedCompletionContract { context: String },
}

/// Result type alias for harvestman operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use browser::{HttpDriver, NavigationError, PageDriver, PageView};
pub use config::{resolve, ConfigLayer, EffectiveConfig};
pub use crawler::{run_suites, Orchestrator};
pub use suite::{Completion, Record, ScrapeFn, Scraper, Suite};

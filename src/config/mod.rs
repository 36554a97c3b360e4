//! Configuration module
//!
//! Configuration is a cascade of layers resolved per scraper:
//! built-in defaults < global < suite < scraper. This module holds the
//! layer/effective types, the resolver, and the TOML run-file parser used
//! by the CLI.

mod parser;
mod resolver;
mod types;

// Re-export types
pub use types::{
    ConfigLayer, EffectiveConfig, PreScrapeHook, ReadyPredicate, ScrapablePredicate,
};

// Re-export resolver
pub use resolver::{
    resolve, DEFAULT_ASYNC_TIMEOUT_MS, DEFAULT_FORMAT, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_READY_TIMEOUT_MS,
};

// Re-export run-file parsing
pub use parser::{
    build_suites, compute_run_hash, load_run_file, OutputSettings, RunFile, ScraperDef,
    StateSettings, SuiteDef,
};

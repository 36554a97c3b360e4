//! Configuration cascade resolution
//!
//! Merges the built-in defaults with the global, suite, and scraper config
//! layers into one effective configuration per scraper. Resolution is a
//! pure function; for every recognized option the result carries the value
//! from the highest-precedence layer that defines it. Validation failures
//! are fatal and carry the suite/scraper context.

use crate::config::types::{ConfigLayer, EffectiveConfig};
use crate::ConfigError;
use scraper::Selector;
use std::time::Duration;

/// Default ceiling for the ready poll
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 3000;

/// Default interval between ready polls
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Default ceiling for the async completion signal
pub const DEFAULT_ASYNC_TIMEOUT_MS: u64 = 3000;

/// Default output serialization
pub const DEFAULT_FORMAT: &str = "json";

/// Resolves the config cascade for one scraper
///
/// Precedence, lowest to highest: built-in defaults, `global`, `suite`,
/// `scraper`. Unset keys fall through untouched; unrecognized keys from all
/// three layers are merged into the effective `extra` map with the same
/// precedence.
///
/// `fn_is_async` is the completion contract of the scraper's function:
/// `Some(true)` for a completion-signalled function, `Some(false)` for a
/// synchronous one, `None` when no scrape function is in play (e.g. when
/// resolving output options only), which skips the contract check.
///
/// # Errors
///
/// * `ConfigError::InvalidSelector` - `selector` is not a parseable CSS selector
/// * `ConfigError::MissingCompletionContract` - `async` is set for a synchronous function
/// * `ConfigError::UnexpectedCompletionContract` - a completion-signalled function without `async`
/// * `ConfigError::Validation` - zero timeouts, zero visit bounds, empty field lists
pub fn resolve(
    global: &ConfigLayer,
    suite: &ConfigLayer,
    scraper: &ConfigLayer,
    fn_is_async: Option<bool>,
    context: &str,
) -> Result<EffectiveConfig, ConfigError> {
    let max_depth = scraper.max_depth.or(suite.max_depth).or(global.max_depth);
    let max_visits = scraper
        .max_visits
        .or(suite.max_visits)
        .or(global.max_visits);
    let selector = scraper
        .selector
        .clone()
        .or_else(|| suite.selector.clone())
        .or_else(|| global.selector.clone());
    let follow_links = scraper
        .follow_links
        .or(suite.follow_links)
        .or(global.follow_links)
        .unwrap_or(false);
    let allow_repeat = scraper
        .allow_repeat
        .or(suite.allow_repeat)
        .or(global.allow_repeat)
        .unwrap_or(false);
    let ready = scraper
        .ready
        .clone()
        .or_else(|| suite.ready.clone())
        .or_else(|| global.ready.clone());
    let ready_timeout_ms = scraper
        .ready_timeout_ms
        .or(suite.ready_timeout_ms)
        .or(global.ready_timeout_ms)
        .unwrap_or(DEFAULT_READY_TIMEOUT_MS);
    let poll_interval_ms = scraper
        .poll_interval_ms
        .or(suite.poll_interval_ms)
        .or(global.poll_interval_ms)
        .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
    let async_scrape = scraper
        .async_scrape
        .or(suite.async_scrape)
        .or(global.async_scrape)
        .unwrap_or(false);
    let async_timeout_ms = scraper
        .async_timeout_ms
        .or(suite.async_timeout_ms)
        .or(global.async_timeout_ms)
        .unwrap_or(DEFAULT_ASYNC_TIMEOUT_MS);
    let delay_ms = scraper
        .delay_ms
        .or(suite.delay_ms)
        .or(global.delay_ms)
        .unwrap_or(0);
    let scrapable = scraper
        .scrapable
        .clone()
        .or_else(|| suite.scrapable.clone())
        .or_else(|| global.scrapable.clone());
    let pre_scrape = scraper
        .pre_scrape
        .clone()
        .or_else(|| suite.pre_scrape.clone())
        .or_else(|| global.pre_scrape.clone());
    let format = scraper
        .format
        .clone()
        .or_else(|| suite.format.clone())
        .or_else(|| global.format.clone())
        .unwrap_or_else(|| DEFAULT_FORMAT.to_string());
    let fields = scraper
        .fields
        .clone()
        .or_else(|| suite.fields.clone())
        .or_else(|| global.fields.clone());
    let auto_fields = scraper
        .auto_fields
        .or(suite.auto_fields)
        .or(global.auto_fields)
        .unwrap_or(false);
    let ignore_duplicates = scraper
        .ignore_duplicates
        .or(suite.ignore_duplicates)
        .or(global.ignore_duplicates)
        .unwrap_or(false);
    let id_field = scraper
        .id_field
        .clone()
        .or_else(|| suite.id_field.clone())
        .or_else(|| global.id_field.clone());

    // Merge unrecognized keys, lowest layer first so later layers win
    let mut extra = serde_json::Map::new();
    for layer in [global, suite, scraper] {
        for (key, value) in &layer.extra {
            extra.insert(key.clone(), value.clone());
        }
    }

    // Validate link selector
    if let Some(sel) = &selector {
        if Selector::parse(sel).is_err() {
            return Err(ConfigError::InvalidSelector {
                context: context.to_string(),
                selector: sel.clone(),
            });
        }
    }

    // Validate the completion contract against the scrape function
    if let Some(is_async) = fn_is_async {
        if async_scrape && !is_async {
            return Err(ConfigError::MissingCompletionContract {
                context: context.to_string(),
            });
        }
        if !async_scrape && is_async {
            return Err(ConfigError::UnexpectedCompletionContract {
                context: context.to_string(),
            });
        }
    }

    if ready_timeout_ms == 0 || poll_interval_ms == 0 || async_timeout_ms == 0 {
        return Err(ConfigError::Validation {
            context: context.to_string(),
            message: "timeouts and poll intervals must be greater than zero".to_string(),
        });
    }

    if max_visits == Some(0) {
        return Err(ConfigError::Validation {
            context: context.to_string(),
            message: "max_visits must be greater than zero when set".to_string(),
        });
    }

    if let Some(list) = &fields {
        if list.is_empty() || list.iter().any(|f| f.is_empty()) {
            return Err(ConfigError::Validation {
                context: context.to_string(),
                message: "fields must be a non-empty list of non-empty names".to_string(),
            });
        }
    }

    Ok(EffectiveConfig {
        max_depth,
        max_visits,
        selector,
        follow_links,
        allow_repeat,
        ready,
        ready_timeout: Duration::from_millis(ready_timeout_ms),
        poll_interval: Duration::from_millis(poll_interval_ms),
        async_scrape,
        async_timeout: Duration::from_millis(async_timeout_ms),
        delay: Duration::from_millis(delay_ms),
        scrapable,
        pre_scrape,
        format,
        fields,
        auto_fields,
        ignore_duplicates,
        id_field,
        extra,
    })
}

//! Page automation boundary
//!
//! The crawl engine never touches HTTP or HTML directly; it drives pages
//! through the [`PageDriver`] trait and reads them through [`PageView`].
//! The shipped [`HttpDriver`] implements the boundary with a plain HTTP
//! client; anything that can produce a `PageView` (a headless browser, a
//! fixture server, a canned map of documents) can stand in for it.

mod http;

pub use http::HttpDriver;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Per-page navigation failure
///
/// Never fatal to a run: the scheduler treats a failed page as "no records,
/// no links" and moves on.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Page error code {status} on {url}")]
    Status { url: String, status: u16 },

    #[error("Page did not load ({message}): {url}")]
    Transport { url: String, message: String },
}

/// Drives navigation for the crawl engine
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigates to `url` and returns a view over the loaded page
    async fn navigate(&self, url: &Url) -> Result<PageView, NavigationError>;
}

/// A loaded page, as seen by predicates, hooks, and scrape functions
///
/// Selector-based accessors parse the document on demand; results follow
/// document order. The variable map is scratch state a pre-scrape hook can
/// seed for the scrape function to read.
#[derive(Debug, Clone)]
pub struct PageView {
    url: Url,
    status: u16,
    html: String,
    vars: serde_json::Map<String, Value>,
}

impl PageView {
    pub fn new(url: Url, status: u16, html: String) -> Self {
        Self {
            url,
            status,
            html,
            vars: serde_json::Map::new(),
        }
    }

    /// The page URL after any redirects
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The final HTTP status
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The raw document text
    pub fn html(&self) -> &str {
        &self.html
    }

    /// The trimmed document title, if any
    pub fn title(&self) -> Option<String> {
        self.first_text("title")
    }

    /// The trimmed text of every element matching `selector`, document order
    ///
    /// An unparseable selector logs a warning and matches nothing.
    pub fn select_text(&self, selector: &str) -> Vec<String> {
        let Ok(sel) = Selector::parse(selector) else {
            tracing::warn!("Ignoring unparseable selector '{}'", selector);
            return Vec::new();
        };
        let document = Html::parse_document(&self.html);
        document
            .select(&sel)
            .map(|element| element.text().collect::<String>().trim().to_string())
            .collect()
    }

    /// The trimmed text of the first element matching `selector`
    pub fn first_text(&self, selector: &str) -> Option<String> {
        self.select_text(selector).into_iter().next()
    }

    /// Returns true if any element matches `selector`
    pub fn exists(&self, selector: &str) -> bool {
        !self.select_text(selector).is_empty()
    }

    /// Link targets in document order, absolutized against the page URL
    ///
    /// `selector` defaults to every anchor. Fragments are stripped so that
    /// `page.html` and `page.html#section` are one URL to the traversal;
    /// unresolvable hrefs are skipped.
    pub fn links(&self, selector: Option<&str>) -> Vec<Url> {
        let selector = selector.unwrap_or("a");
        let Ok(sel) = Selector::parse(selector) else {
            tracing::warn!("Ignoring unparseable link selector '{}'", selector);
            return Vec::new();
        };
        let document = Html::parse_document(&self.html);
        let mut links = Vec::new();
        for element in document.select(&sel) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            match self.url.join(href) {
                Ok(mut link) => {
                    link.set_fragment(None);
                    links.push(link);
                }
                Err(e) => {
                    tracing::debug!("Skipping unresolvable href '{}': {}", href, e);
                }
            }
        }
        links
    }

    /// Reads a page variable set by a pre-scrape hook
    pub fn var(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Sets a page variable
    pub fn set_var(&mut self, name: &str, value: impl Into<Value>) {
        self.vars.insert(name.to_string(), value.into());
    }
}

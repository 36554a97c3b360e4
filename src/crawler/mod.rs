//! Crawl engine
//!
//! This module contains the traversal core:
//! - Page session coordination with timeout-bounded waits
//! - Breadth-first crawl scheduling with loop avoidance and depth bounds
//! - Run orchestration across suites and scrapers

mod coordinator;
mod scheduler;
mod session;

pub use coordinator::{run_suites, Orchestrator};
pub use scheduler::{CrawlScheduler, CrawlTask};
pub use session::{visit, PageOutcome, SkipReason};

#[cfg(test)]
pub(crate) mod fixtures {
    //! Canned pages for driving the engine without a network

    use crate::browser::{NavigationError, PageDriver, PageView};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use url::Url;

    /// Serves pages from a URL-to-document map; everything else is a 404
    #[derive(Debug, Default)]
    pub struct StaticDriver {
        pages: HashMap<String, String>,
    }

    impl StaticDriver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }
    }

    #[async_trait]
    impl PageDriver for StaticDriver {
        async fn navigate(&self, url: &Url) -> Result<PageView, NavigationError> {
            match self.pages.get(url.as_str()) {
                Some(html) => Ok(PageView::new(url.clone(), 200, html.clone())),
                None => Err(NavigationError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    /// A minimal page with a title, an h1, and a link list
    pub fn html_page(title: &str, links: &[&str]) -> String {
        let items: String = links
            .iter()
            .map(|link| format!("<li><a href=\"{link}\">{link}</a></li>"))
            .collect();
        format!(
            "<html><head><title>{title}</title></head>\
             <body><h1>{title}</h1><ul>{items}</ul></body></html>"
        )
    }
}

//! HTTP-backed page driver
//!
//! The default implementation of the automation boundary: navigation is a
//! plain GET, the loaded page is the response body. Redirects are followed
//! by the client; the view reports the final URL so relative links resolve
//! against where the page actually lives.

use crate::browser::{NavigationError, PageDriver, PageView};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const DEFAULT_USER_AGENT: &str = concat!("harvestman/", env!("CARGO_PKG_VERSION"));

/// Fetches pages over HTTP with a shared client
pub struct HttpDriver {
    client: Client,
}

impl HttpDriver {
    /// Builds a driver with the default user agent
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Builds a driver identifying itself as `user_agent`
    pub fn with_user_agent(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageDriver for HttpDriver {
    async fn navigate(&self, url: &Url) -> Result<PageView, NavigationError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| NavigationError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(NavigationError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| NavigationError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        Ok(PageView::new(final_url, status.as_u16(), body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_build_driver() {
        assert!(HttpDriver::new().is_ok());
        assert!(HttpDriver::with_user_agent("TestBot/0.1").is_ok());
    }

    #[tokio::test]
    async fn test_navigate_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><head><title>Hi</title></head></html>"),
            )
            .mount(&server)
            .await;

        let driver = HttpDriver::new().unwrap();
        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
        let page = driver.navigate(&url).await.unwrap();

        assert_eq!(page.status(), 200);
        assert_eq!(page.title().as_deref(), Some("Hi"));
    }

    #[tokio::test]
    async fn test_navigate_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let driver = HttpDriver::new().unwrap();
        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let result = driver.navigate(&url).await;

        assert!(matches!(
            result,
            Err(NavigationError::Status { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_navigate_connection_refused() {
        let driver = HttpDriver::new().unwrap();
        // nothing listens on this port
        let url = Url::parse("http://127.0.0.1:1/nope").unwrap();
        let result = driver.navigate(&url).await;

        assert!(matches!(result, Err(NavigationError::Transport { .. })));
    }
}

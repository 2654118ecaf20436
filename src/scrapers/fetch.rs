//! Page fetching for the outbreak scraper.
//!
//! [`FetchPage`] is the seam between the batch driver and the network, so
//! the driver can be exercised against canned pages. [`HttpFetcher`] is the
//! real implementation over `reqwest`.

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use reqwest::Client;
use std::fmt;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use url::Url;

/// Something that can turn a URL into an HTML document.
pub trait FetchPage {
    /// Fetch the page body at `url`.
    async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError>;
}

/// HTTP fetcher with a fixed per-request timeout and user agent.
///
/// A timeout, transport error, or non-2xx status is a [`ScrapeError`] for
/// that URL only. There are no retries.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

impl fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFetcher").finish_non_exhaustive()
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError> {
        let parsed = Url::parse(url).map_err(|source| ScrapeError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let t0 = Instant::now();
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| ScrapeError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Non-success status");
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        })?;
        debug!(bytes = body.len(), elapsed_ms = t0.elapsed().as_millis() as u64, "Fetched page");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&ScrapeConfig {
            timeout_secs: 5,
            ..ScrapeConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_page_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/article")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><title>Hi</title></html>")
            .create_async()
            .await;

        let body = fetcher()
            .fetch_page(&format!("{}/article", server.url()))
            .await
            .unwrap();

        assert!(body.contains("<title>Hi</title>"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_page_http_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let err = fetcher()
            .fetch_page(&format!("{}/missing", server.url()))
            .await
            .unwrap_err();

        match err {
            ScrapeError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_page_invalid_url() {
        let err = fetcher().fetch_page("not a url").await.unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_fetch_page_timeout_is_fetch_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _silent = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        let fetcher = HttpFetcher::new(&ScrapeConfig {
            timeout_secs: 1,
            ..ScrapeConfig::default()
        })
        .unwrap();

        let err = fetcher.fetch_page(&format!("http://{addr}/slow")).await.unwrap_err();

        match err {
            ScrapeError::Fetch { source, .. } => assert!(source.is_timeout()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_page_connection_refused_is_fetch_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = fetcher()
            .fetch_page(&format!("http://127.0.0.1:{port}/gone"))
            .await
            .unwrap_err();

        assert!(matches!(err, ScrapeError::Fetch { .. }));
    }
}

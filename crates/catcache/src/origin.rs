//! Origin fetching for cache misses

use crate::error::OriginError;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for the remote image service
pub struct OriginFetcher {
    client: Client,
    base_url: String,
}

impl OriginFetcher {
    /// Default origin, keyed by HTTP status code
    pub const DEFAULT_BASE_URL: &'static str = "https://http.cat";

    /// Create a fetcher for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, OriginError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a fetcher around an already configured client
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL fetched for a key
    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}.jpg", self.base_url, urlencoding::encode(key))
    }

    /// Fetch the image for a key. Single attempt, no retries.
    pub async fn fetch(&self, key: &str) -> Result<Vec<u8>, OriginError> {
        let url = self.url_for(key);
        debug!(url = %url, "Fetching image from origin");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), url = %url, "Origin refused image");
            return Err(OriginError::Status(response.status()));
        }

        let data = response.bytes().await?.to_vec();

        debug!(key, size = data.len(), "Fetched image from origin");
        Ok(data)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode, routing::get, Router};

    /// Client that ignores any proxy configured in the environment
    pub(crate) fn local_fetcher(base_url: &str) -> OriginFetcher {
        local_fetcher_with_timeout(base_url, Duration::from_secs(5))
    }

    pub(crate) fn local_fetcher_with_timeout(base_url: &str, timeout: Duration) -> OriginFetcher {
        let client = Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .unwrap();
        OriginFetcher::with_client(client, base_url)
    }

    /// Origin that answers every request only after `delay`
    pub(crate) async fn spawn_slow_origin(delay: Duration) -> String {
        let router = Router::new().route(
            "/{file}",
            get(move || async move {
                tokio::time::sleep(delay).await;
                vec![0xFF, 0xD8, 0xFF, 0xD9]
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await });
        format!("http://{}", addr)
    }

    async fn spawn_origin() -> String {
        let router = Router::new().route(
            "/{file}",
            get(|Path(file): Path<String>| async move {
                match file.as_str() {
                    "200.jpg" => Ok(vec![0xFF, 0xD8, 0xC8, 0xFF, 0xD9]),
                    _ => Err(StatusCode::NOT_FOUND),
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await });
        format!("http://{}", addr)
    }

    #[test]
    fn test_url_for() {
        let fetcher = OriginFetcher::new("https://http.cat/", Duration::from_secs(5)).unwrap();
        assert_eq!(fetcher.base_url(), "https://http.cat");
        assert_eq!(fetcher.url_for("404"), "https://http.cat/404.jpg");
    }

    #[test]
    fn test_url_for_encodes_key() {
        let fetcher = OriginFetcher::new("https://http.cat", Duration::from_secs(5)).unwrap();
        assert_eq!(fetcher.url_for("a b"), "https://http.cat/a%20b.jpg");
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let base = spawn_origin().await;
        let fetcher = local_fetcher(&base);

        let data = fetcher.fetch("200").await.unwrap();
        assert_eq!(data, vec![0xFF, 0xD8, 0xC8, 0xFF, 0xD9]);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let base = spawn_origin().await;
        let fetcher = local_fetcher(&base);

        let result = fetcher.fetch("999").await;
        assert!(matches!(
            result,
            Err(OriginError::Status(StatusCode::NOT_FOUND))
        ));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let base = spawn_slow_origin(Duration::from_secs(2)).await;
        let fetcher = local_fetcher_with_timeout(&base, Duration::from_millis(200));

        match fetcher.fetch("504").await {
            Err(OriginError::Http(err)) => assert!(err.is_timeout()),
            other => panic!("expected timeout, got {:?}", other.map(|d| d.len())),
        }
    }

    #[tokio::test]
    async fn test_fetch_unreachable_origin() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = local_fetcher(&format!("http://{}", addr));

        assert!(matches!(
            fetcher.fetch("200").await,
            Err(OriginError::Http(_))
        ));
    }
}

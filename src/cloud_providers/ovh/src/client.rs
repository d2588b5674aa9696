use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use ovhcat_catalog::{FeedResource, FeedSource};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Anonymous client of the public price feeds, all served under one base URL.
pub struct HttpFeedClient {
    client: Client,
    base_url: Url,
    retries: usize,
}

impl HttpFeedClient {
    pub fn new(base_url: &str) -> Result<Self> {
        // a trailing slash keeps the last path segment on join
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .with_context(|| format!("invalid prices url {base_url}"))?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build the http client")?;
        Ok(Self {
            client,
            base_url,
            retries: 2,
        })
    }

    /// Extra attempts after a failed one.
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    pub fn url_of(&self, resource: FeedResource) -> Result<Url> {
        self.base_url
            .join(resource.path().trim_start_matches('/'))
            .with_context(|| format!("invalid feed path {resource}"))
    }

    async fn get(&self, url: &Url) -> Result<Option<Value>> {
        match self.client.get(url.clone()).send().await {
            Ok(res) if res.status() == StatusCode::OK => {
                res.json::<Value>().await.map(Some).map_err(|e| {
                    tracing::warn!(error = ?e, %url, "failed to parse feed body");
                    anyhow::anyhow!("failed to parse {url}: {e}")
                })
            }
            Ok(res) if res.status() == StatusCode::NOT_FOUND => Ok(None),
            Ok(res) => {
                let status = res.status();
                let text = res.text().await.unwrap_or_default();
                tracing::warn!(%status, %text, %url, "feed returned non-OK status");
                Err(anyhow::anyhow!("non-OK response {status} from {url}"))
            }
            Err(e) => {
                tracing::warn!(error = ?e, %url, "http request to feed failed");
                Err(anyhow::anyhow!("http error on {url}: {e}"))
            }
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedClient {
    async fn fetch(&self, resource: FeedResource) -> Result<Option<Value>> {
        let url = self.url_of(resource)?;
        let strategy = ExponentialBackoff::from_millis(100).take(self.retries);
        let body = Retry::spawn(strategy, || self.get(&url)).await?;
        match &body {
            Some(_) => tracing::debug!(%url, "feed retrieved"),
            None => tracing::debug!(%url, "feed not found"),
        }
        Ok(body)
    }
}

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode, Url};
use shared::config::StoreConfig;
use shared::{Error, Result};
use std::time::Duration;
use tracing::debug;
use ttlstore::{Location, StoreClient};

/// Store client for the Riak HTTP interface.
///
/// Each record is one Riak object at `/buckets/{bucket}/keys/{namespace}/{key}`,
/// with the namespace and key sent as a single percent-encoded path segment.
/// Timeouts come from the underlying HTTP client; nothing is retried.
#[derive(Clone, Debug)]
pub struct RiakClient {
    client: Client,
    base_url: Url,
}

impl RiakClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid Riak URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("Invalid Riak URL '{}'", base_url)));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::new(&config.base_url(), config.timeout)
    }

    /// Check that the node answers `GET /ping`
    pub async fn ping(&self) -> Result<()> {
        let url = self.url(&["ping"]);
        let response = self.client.get(url).send().await.map_err(unavailable)?;

        match response.status() {
            status if status.is_success() => Ok(()),
            status => Err(Error::StoreUnavailable(format!("ping returned {}", status))),
        }
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base() is rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn object_url(&self, location: &Location) -> Url {
        let object_key = location.object_key();
        self.url(&["buckets", &location.bucket, "keys", &object_key])
    }
}

fn unavailable(err: reqwest::Error) -> Error {
    Error::StoreUnavailable(format!("Riak request failed: {}", err))
}

#[async_trait]
impl StoreClient for RiakClient {
    async fn fetch(&self, location: &Location) -> Result<Option<Bytes>> {
        let url = self.object_url(location);
        debug!("Riak GET {}", url);

        let response = self.client.get(url).send().await.map_err(unavailable)?;
        match response.status() {
            StatusCode::OK => response.bytes().await.map(Some).map_err(unavailable),
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::MULTIPLE_CHOICES => Err(Error::StoreUnavailable(format!(
                "{} has conflicting siblings",
                location
            ))),
            status => Err(Error::StoreUnavailable(format!(
                "GET {} returned {}",
                location, status
            ))),
        }
    }

    async fn store(&self, location: &Location, payload: Bytes) -> Result<()> {
        let url = self.object_url(location);
        debug!("Riak PUT {} ({} bytes)", url, payload.len());

        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(unavailable)?;

        match response.status() {
            status if status.is_success() => Ok(()),
            status => Err(Error::StoreUnavailable(format!(
                "PUT {} returned {}",
                location, status
            ))),
        }
    }

    async fn delete(&self, location: &Location) -> Result<()> {
        let url = self.object_url(location);
        debug!("Riak DELETE {}", url);

        let response = self.client.delete(url).send().await.map_err(unavailable)?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Ok(()),
            status => Err(Error::StoreUnavailable(format!(
                "DELETE {} returned {}",
                location, status
            ))),
        }
    }
}

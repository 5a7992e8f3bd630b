use crate::clock::{Clock, SystemClock};
use crate::codec::{Codec, JsonCodec};
use crate::domain::{Location, Record, validate_expiry};
use crate::ports::{StorageFactory, Store, StoreClient};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::config::StoreConfig;
use shared::{Result, UnixTime};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// TTL-aware key/value facade over a [`StoreClient`].
///
/// Records live at `(bucket, namespace, key)`. Expiry is enforced lazily: a
/// read that finds an expired record deletes it and reports it as absent.
/// Every call is exactly one backend operation, plus one delete on that
/// lazy-expiry path. Nothing is retried.
pub struct TtlStore<C: Codec = JsonCodec> {
    client: Arc<dyn StoreClient>,
    clock: Arc<dyn Clock>,
    codec: C,
    bucket: String,
}

impl TtlStore<JsonCodec> {
    /// Create a store using the JSON codec and the system clock
    pub fn new(client: Arc<dyn StoreClient>, bucket: impl Into<String>) -> Self {
        Self::with_parts(client, Arc::new(SystemClock), JsonCodec, bucket)
    }

    /// Open the configured backend through `factory`
    pub fn from_config(config: &StoreConfig, factory: &dyn StorageFactory) -> Result<Self> {
        let client = factory.create_from_config(config)?;
        debug!(
            "Opened {} backend for bucket '{}'",
            config.backend.as_str(),
            config.bucket
        );
        Ok(Self::new(client, config.bucket.clone()))
    }
}

impl<C: Codec> TtlStore<C> {
    pub fn with_parts(
        client: Arc<dyn StoreClient>,
        clock: Arc<dyn Clock>,
        codec: C,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            client,
            clock,
            codec,
            bucket: bucket.into(),
        }
    }

    /// Replace the clock used for expiry checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Location a `(namespace, key)` pair maps to
    pub fn locate(&self, namespace: &str, key: &str) -> Result<Location> {
        Location::new(self.bucket.as_str(), namespace, key)
    }

    /// Absolute expiry `ttl` from now, suitable for [`TtlStore::set`]
    pub fn expires_in(&self, ttl: Duration) -> UnixTime {
        let secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        self.clock.now().saturating_add(secs)
    }

    pub async fn get<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> Result<Option<T>> {
        let location = self.locate(namespace, key)?;
        debug!("GET: {}", location);

        match self.fetch_live(&location).await? {
            Some(record) => self.codec.decode(&record.value).map(Some),
            None => Ok(None),
        }
    }

    pub async fn set<T: Serialize + ?Sized>(
        &self,
        namespace: &str,
        key: &str,
        value: &T,
        expire: Option<UnixTime>,
    ) -> Result<()> {
        let location = self.locate(namespace, key)?;
        let expires = expire.map(validate_expiry).transpose()?;
        debug!("SET: {} expires={:?}", location, expires);

        let record = Record::new(self.codec.encode(value)?, expires);
        self.client.store(&location, record.encode()?).await
    }

    pub async fn delete(&self, namespace: &str, key: &str) -> Result<()> {
        let location = self.locate(namespace, key)?;
        debug!("DELETE: {}", location);
        self.client.delete(&location).await
    }

    /// Whether a live record exists; applies the same lazy expiry as `get`
    pub async fn contains(&self, namespace: &str, key: &str) -> Result<bool> {
        let location = self.locate(namespace, key)?;
        Ok(self.fetch_live(&location).await?.is_some())
    }

    /// Release the backend
    pub async fn close(self) -> Result<()> {
        self.client.close().await
    }

    async fn fetch_live(&self, location: &Location) -> Result<Option<Record>> {
        let Some(payload) = self.client.fetch(location).await? else {
            return Ok(None);
        };

        let record = Record::decode(&payload)?;
        let now = self.clock.now();
        if record.is_expired(now) {
            debug!(
                "Expired record at {} (expires={:?}, now={}), deleting",
                location, record.expires, now
            );
            self.client.delete(location).await?;
            return Ok(None);
        }

        Ok(Some(record))
    }
}

#[async_trait]
impl<C: Codec> Store for TtlStore<C> {
    async fn get<T>(&self, namespace: &str, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        TtlStore::<C>::get(self, namespace, key).await
    }

    async fn set<T>(
        &self,
        namespace: &str,
        key: &str,
        value: &T,
        expire: Option<UnixTime>,
    ) -> Result<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        TtlStore::<C>::set(self, namespace, key, value, expire).await
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<()> {
        TtlStore::<C>::delete(self, namespace, key).await
    }
}

impl<C: Codec> std::fmt::Debug for TtlStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlStore")
            .field("bucket", &self.bucket)
            .field("client", &"<dyn StoreClient>")
            .finish()
    }
}

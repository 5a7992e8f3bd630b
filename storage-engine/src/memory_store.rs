use async_trait::async_trait;
use bytes::Bytes;
use moka::future::Cache;
use shared::Result;
use std::fmt::Debug;
use ttlstore::{Location, StoreClient};

/// Moka-based in-process store client
/// Expiry is left to the facade, so the cache is built without a TTL
pub struct MemoryStore {
    cache: Cache<Location, Bytes>,
}

impl MemoryStore {
    /// Create a new unbounded memory store
    pub fn new_unbounded() -> Self {
        Self {
            cache: Cache::builder().build(),
        }
    }

    /// Create a new memory store holding at most `max_entries` records.
    ///
    /// A bounded store is a lossy cache, not a session store: moka may evict
    /// records that were already acknowledged, so a later `get` before expiry
    /// can return `None`.
    pub fn new_bounded(max_entries: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_entries).build(),
        }
    }

    /// Create a memory store from name and optional capacity
    /// With a capacity this is lossy, see [`MemoryStore::new_bounded`]
    pub fn new(name: &str, max_entries: Option<u64>) -> Self {
        let mut builder = Cache::builder().name(name);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        Self {
            cache: builder.build(),
        }
    }

    /// Whether a record is present, ignoring its expiry
    pub fn contains(&self, location: &Location) -> bool {
        self.cache.contains_key(location)
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn fetch(&self, location: &Location) -> Result<Option<Bytes>> {
        Ok(self.cache.get(location).await)
    }

    async fn store(&self, location: &Location, payload: Bytes) -> Result<()> {
        self.cache.insert(location.clone(), payload).await;
        Ok(())
    }

    async fn delete(&self, location: &Location) -> Result<()> {
        self.cache.invalidate(location).await;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.cache.invalidate_all();
        Ok(())
    }
}

impl Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}

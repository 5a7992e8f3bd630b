#![deny(clippy::all)]

use crate::domain::Location;
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::config::StoreConfig;
use shared::{Result, UnixTime};
use std::sync::Arc;

// Ports are the pluggable extension points for backing stores

/// Port for creating a store client from configuration
/// This allows different storage backends to be plugged in
pub trait StorageFactory: Send + Sync + 'static {
    /// Open a store client for the configured backend
    fn create_from_config(&self, config: &StoreConfig) -> Result<Arc<dyn StoreClient>>;
}

/// Port for raw record access on a backing store (e.g., Riak)
#[async_trait]
pub trait StoreClient: Send + Sync + 'static {
    async fn fetch(&self, location: &Location) -> Result<Option<Bytes>>;
    async fn store(&self, location: &Location, payload: Bytes) -> Result<()>;
    /// Removing a missing record is not an error.
    async fn delete(&self, location: &Location) -> Result<()>;
    /// Release backend resources; the client must not be used afterwards.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Capability set of a TTL-aware value store
#[async_trait]
pub trait Store: Send + Sync {
    async fn get<T>(&self, namespace: &str, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send;

    async fn set<T>(
        &self,
        namespace: &str,
        key: &str,
        value: &T,
        expire: Option<UnixTime>,
    ) -> Result<()>
    where
        T: Serialize + Sync + ?Sized;

    async fn delete(&self, namespace: &str, key: &str) -> Result<()>;
}

use crate::domain::Location;
use crate::ports::StoreClient;
use async_trait::async_trait;
use bytes::Bytes;
use shared::{Error, Result};
use std::path::Path;

/// Sled-based store client
/// One tree per bucket, object keys are `namespace/key`
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open (or create) a Sled database at `path`
    /// Creates the parent directory if it doesn't exist
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::StoreUnavailable(format!("Failed to create directory: {}", e))
            })?;
        }

        let db = sled::open(path)
            .map_err(|e| Error::StoreUnavailable(format!("Failed to open Sled database: {}", e)))?;

        Ok(Self { db })
    }

    fn tree(&self, bucket: &str) -> Result<sled::Tree> {
        self.db
            .open_tree(bucket)
            .map_err(|e| Error::StoreUnavailable(format!("Failed to open tree '{}': {}", bucket, e)))
    }

    fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| Error::StoreUnavailable(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl StoreClient for SledStore {
    async fn fetch(&self, location: &Location) -> Result<Option<Bytes>> {
        let value = self
            .tree(&location.bucket)?
            .get(location.object_key().as_bytes())
            .map_err(|e| Error::StoreUnavailable(format!("Failed to get {}: {}", location, e)))?;

        Ok(value.map(|bytes| Bytes::copy_from_slice(&bytes)))
    }

    async fn store(&self, location: &Location, payload: Bytes) -> Result<()> {
        self.tree(&location.bucket)?
            .insert(location.object_key().as_bytes(), payload.as_ref())
            .map_err(|e| Error::StoreUnavailable(format!("Failed to save {}: {}", location, e)))?;

        self.flush()
    }

    async fn delete(&self, location: &Location) -> Result<()> {
        self.tree(&location.bucket)?
            .remove(location.object_key().as_bytes())
            .map_err(|e| Error::StoreUnavailable(format!("Failed to delete {}: {}", location, e)))?;

        self.flush()
    }

    async fn close(&self) -> Result<()> {
        self.flush()
    }
}

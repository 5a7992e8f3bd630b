use shared::Result;
use shared::config::{Backend, StoreConfig};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use ttlstore::{SledStore, StorageFactory, StoreClient};

pub mod memory_store;
pub mod riak_client;

pub use memory_store::MemoryStore;
pub use riak_client::RiakClient;

/// File name of the sled database inside the data directory
pub const SLED_DB_NAME: &str = "ttlstore.sled";

/// Opens the backend named by [`StoreConfig::backend`]
#[derive(Clone, Copy, Debug, Default)]
pub struct BackendFactory;

impl StorageFactory for BackendFactory {
    fn create_from_config(&self, config: &StoreConfig) -> Result<Arc<dyn StoreClient>> {
        match config.backend {
            Backend::Riak => {
                info!("Using Riak backend at {}", config.base_url());
                Ok(Arc::new(RiakClient::from_config(config)?))
            }
            Backend::Sled => {
                let path = Path::new(&config.data_dir).join(SLED_DB_NAME);
                info!("Using Sled backend at {}", path.display());
                Ok(Arc::new(SledStore::new(path)?))
            }
            Backend::Memory => {
                info!("Using in-memory backend");
                Ok(Arc::new(MemoryStore::new(&config.bucket, config.max_entries)))
            }
        }
    }
}

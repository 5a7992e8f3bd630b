use serde::{Deserialize, Serialize};
use shared::config::{Backend, StoreConfig};
use shared::{Error, Result};
use std::time::Duration;
use storage_engine::{BackendFactory, RiakClient};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use ttlstore::TtlStore;

const PROBE_NAMESPACE: &str = "probe";
const PROBE_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct ProbeValue {
    pid: u32,
    written_at: i64,
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting ttlstore probe");

    // Load environment variables
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = StoreConfig::from_env()?;
    info!(
        "Probing {} backend, bucket '{}'",
        config.backend.as_str(),
        config.bucket
    );

    if let Err(e) = probe(&config).await {
        error!("Probe failed: {}", e);
        return Err(e.into());
    }

    info!("Probe succeeded");
    Ok(())
}

async fn probe(config: &StoreConfig) -> Result<()> {
    if config.backend == Backend::Riak {
        RiakClient::from_config(config)?.ping().await?;
        info!("Riak node at {} answered ping", config.base_url());
    }

    let store = TtlStore::from_config(config, &BackendFactory)?;
    let key = format!("probe-{}", std::process::id());
    let expire = store.expires_in(PROBE_TTL);
    let value = ProbeValue {
        pid: std::process::id(),
        written_at: expire - PROBE_TTL.as_secs() as i64,
    };

    store.set(PROBE_NAMESPACE, &key, &value, Some(expire)).await?;
    info!("Wrote {}/{} (expires={})", PROBE_NAMESPACE, key, expire);

    let read_back: Option<ProbeValue> = store.get(PROBE_NAMESPACE, &key).await?;
    if read_back.as_ref() != Some(&value) {
        return Err(Error::StoreUnavailable(format!(
            "read back {:?}, expected {:?}",
            read_back, value
        )));
    }
    info!("Read back {}/{}", PROBE_NAMESPACE, key);

    store.delete(PROBE_NAMESPACE, &key).await?;
    if store.contains(PROBE_NAMESPACE, &key).await? {
        return Err(Error::StoreUnavailable(format!(
            "{}/{} still present after delete",
            PROBE_NAMESPACE, key
        )));
    }
    info!("Deleted {}/{}", PROBE_NAMESPACE, key);

    store.close().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_against_memory_backend() {
        let config = StoreConfig {
            backend: Backend::Memory,
            ..StoreConfig::default()
        };

        probe(&config).await.unwrap();
    }

    #[tokio::test]
    async fn test_probe_reports_unreachable_riak() {
        let config = StoreConfig {
            port: 1,
            timeout: Duration::from_millis(200),
            ..StoreConfig::default()
        };

        assert!(matches!(
            probe(&config).await,
            Err(Error::StoreUnavailable(_))
        ));
    }
}

use crate::{Error, Result};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Backend a store is opened against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Riak,
    Sled,
    Memory,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "riak" => Ok(Backend::Riak),
            "sled" => Ok(Backend::Sled),
            "memory" => Ok(Backend::Memory),
            other => Err(Error::Config(format!("unknown backend '{}'", other))),
        }
    }
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Riak => "riak",
            Backend::Sled => "sled",
            Backend::Memory => "memory",
        }
    }
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub backend: Backend,
    pub host: String,
    pub port: u16,
    pub bucket: String,
    pub data_dir: String,
    pub timeout: Duration,
    pub max_entries: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Riak,
            host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
            bucket: Self::DEFAULT_BUCKET.to_string(),
            data_dir: Self::DEFAULT_DATA_DIR.to_string(),
            timeout: Duration::from_millis(Self::DEFAULT_TIMEOUT_MS),
            max_entries: None,
        }
    }
}

impl StoreConfig {
    const DEFAULT_HOST: &str = "localhost";
    const DEFAULT_PORT: u16 = 8098;
    const DEFAULT_BUCKET: &str = "simpleSAMLphp";
    const DEFAULT_DATA_DIR: &str = "./data";
    const DEFAULT_TIMEOUT_MS: u64 = 5000;

    /// Read the configuration from `TTLSTORE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`StoreConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("TTLSTORE_BACKEND") {
            Some(name) => name.parse()?,
            None => Backend::Riak,
        };

        let port = match lookup("TTLSTORE_PORT") {
            Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
                warn!(
                    "TTLSTORE_PORT '{}' is not a valid port, using {}",
                    raw,
                    Self::DEFAULT_PORT
                );
                Self::DEFAULT_PORT
            }),
            None => Self::DEFAULT_PORT,
        };

        let timeout_ms = match lookup("TTLSTORE_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                warn!(
                    "TTLSTORE_TIMEOUT_MS '{}' is not a number, using {}",
                    raw,
                    Self::DEFAULT_TIMEOUT_MS
                );
                Self::DEFAULT_TIMEOUT_MS
            }),
            None => Self::DEFAULT_TIMEOUT_MS,
        };

        // A bound makes the memory backend a lossy cache: acknowledged
        // records may be evicted before they expire.
        let max_entries = match lookup("TTLSTORE_MAX_ENTRIES") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(max) => Some(max),
                Err(_) => {
                    warn!("TTLSTORE_MAX_ENTRIES '{}' is not a number, ignoring", raw);
                    None
                }
            },
            None => None,
        };

        let bucket = lookup("TTLSTORE_BUCKET").unwrap_or_else(|| Self::DEFAULT_BUCKET.to_string());
        if bucket.is_empty() {
            return Err(Error::Config("TTLSTORE_BUCKET must not be empty".to_string()));
        }

        Ok(Self {
            backend,
            host: lookup("TTLSTORE_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            port,
            bucket,
            data_dir: lookup("TTLSTORE_DATA_DIR")
                .unwrap_or_else(|| Self::DEFAULT_DATA_DIR.to_string()),
            timeout: Duration::from_millis(timeout_ms),
            max_entries,
        })
    }

    /// Base URL of the Riak HTTP interface.
    /// IPv6 literals are bracketed.
    pub fn base_url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("http://[{}]:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.backend, Backend::Riak);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8098);
        assert_eq!(config.bucket, "simpleSAMLphp");
        assert_eq!(config.timeout, Duration::from_millis(5000));
        assert_eq!(config.max_entries, None);
        assert_eq!(config.base_url(), "http://localhost:8098");
    }

    #[test]
    fn test_overrides() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("TTLSTORE_BACKEND", "Sled"),
            ("TTLSTORE_HOST", "riak.internal"),
            ("TTLSTORE_PORT", "18098"),
            ("TTLSTORE_BUCKET", "sessions"),
            ("TTLSTORE_DATA_DIR", "/var/lib/ttlstore"),
            ("TTLSTORE_MAX_ENTRIES", "1000"),
        ]))
        .unwrap();

        assert_eq!(config.backend, Backend::Sled);
        assert_eq!(config.host, "riak.internal");
        assert_eq!(config.port, 18098);
        assert_eq!(config.bucket, "sessions");
        assert_eq!(config.data_dir, "/var/lib/ttlstore");
        assert_eq!(config.max_entries, Some(1000));
        assert_eq!(config.base_url(), "http://riak.internal:18098");
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let config = StoreConfig::from_lookup(lookup_from(&[("TTLSTORE_HOST", "::1")])).unwrap();
        assert_eq!(config.base_url(), "http://[::1]:8098");

        let config =
            StoreConfig::from_lookup(lookup_from(&[("TTLSTORE_HOST", "[fe80::1]")])).unwrap();
        assert_eq!(config.base_url(), "http://[fe80::1]:8098");
    }

    #[test]
    fn test_bad_max_entries_is_ignored() {
        let config =
            StoreConfig::from_lookup(lookup_from(&[("TTLSTORE_MAX_ENTRIES", "lots")])).unwrap();
        assert_eq!(config.max_entries, None);
    }

    #[test]
    fn test_bad_port_falls_back_to_default() {
        let config =
            StoreConfig::from_lookup(lookup_from(&[("TTLSTORE_PORT", "not-a-port")])).unwrap();
        assert_eq!(config.port, 8098);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result = StoreConfig::from_lookup(lookup_from(&[("TTLSTORE_BACKEND", "etcd")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_bucket_is_rejected() {
        let result = StoreConfig::from_lookup(lookup_from(&[("TTLSTORE_BUCKET", "")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}

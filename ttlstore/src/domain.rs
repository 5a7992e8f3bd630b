use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use shared::{Error, Result, UnixTime};
use std::fmt;

/// Expiry values at or below this (30 days, in seconds) are rejected: they
/// look like relative durations rather than absolute timestamps.
pub const MIN_EXPIRY: UnixTime = 30 * 24 * 60 * 60;

/// Separator between namespace and key in flattened object keys.
pub const NAMESPACE_SEPARATOR: char = '/';

/// Address of one record in the backing store
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub bucket: String,
    pub namespace: String,
    pub key: String,
}

impl Location {
    /// Build a location, rejecting empty parts and namespaces that contain
    /// the separator.
    pub fn new(
        bucket: impl Into<String>,
        namespace: impl Into<String>,
        key: impl Into<String>,
    ) -> Result<Self> {
        let bucket = bucket.into();
        let namespace = namespace.into();
        let key = key.into();

        if bucket.is_empty() {
            return Err(Error::InvalidArgument("bucket must not be empty".to_string()));
        }
        if namespace.is_empty() {
            return Err(Error::InvalidArgument("namespace must not be empty".to_string()));
        }
        if namespace.contains(NAMESPACE_SEPARATOR) {
            return Err(Error::InvalidArgument(format!(
                "namespace '{}' must not contain '{}'",
                namespace, NAMESPACE_SEPARATOR
            )));
        }
        if key.is_empty() {
            return Err(Error::InvalidArgument("key must not be empty".to_string()));
        }

        Ok(Self {
            bucket,
            namespace,
            key,
        })
    }

    /// Single-string object key used by backends with flat key spaces.
    pub fn object_key(&self) -> String {
        format!("{}{}{}", self.namespace, NAMESPACE_SEPARATOR, self.key)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.object_key())
    }
}

/// Check a caller-supplied expiry timestamp.
pub fn validate_expiry(expires: UnixTime) -> Result<UnixTime> {
    if expires <= MIN_EXPIRY {
        return Err(Error::InvalidArgument(format!(
            "expiry {} is not an absolute unix timestamp (must be > {})",
            expires, MIN_EXPIRY
        )));
    }
    Ok(expires)
}

/// Envelope written to the backing store for every value
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(with = "base64_bytes")]
    pub value: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<UnixTime>,
}

impl Record {
    pub fn new(value: Vec<u8>, expires: Option<UnixTime>) -> Self {
        Self { value, expires }
    }

    pub fn is_expired(&self, now: UnixTime) -> bool {
        matches!(self.expires, Some(expires) if expires <= now)
    }

    pub fn encode(&self) -> Result<Bytes> {
        serde_json::to_vec(self)
            .map(Bytes::from)
            .map_err(|e| Error::Serialization(format!("Failed to encode record: {}", e)))
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| Error::Deserialization(format!("Failed to decode record: {}", e)))
    }
}

mod base64_bytes {
    use super::{Engine, STANDARD};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_rejects_empty_parts() {
        assert!(matches!(
            Location::new("bucket", "", "key"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Location::new("bucket", "session", ""),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Location::new("", "session", "key"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_location_rejects_separator_in_namespace() {
        let result = Location::new("bucket", "a/b", "key");
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_object_key_keeps_slashes_in_key() {
        let location = Location::new("simpleSAMLphp", "session", "a/b").unwrap();
        assert_eq!(location.object_key(), "session/a/b");
        assert_eq!(location.to_string(), "simpleSAMLphp/session/a/b");
    }

    #[test]
    fn test_validate_expiry() {
        assert!(validate_expiry(5).is_err());
        assert!(validate_expiry(MIN_EXPIRY).is_err());
        assert_eq!(validate_expiry(MIN_EXPIRY + 1).unwrap(), MIN_EXPIRY + 1);
    }

    #[test]
    fn test_record_expiry_boundary() {
        let record = Record::new(b"v".to_vec(), Some(1_700_000_000));
        assert!(!record.is_expired(1_699_999_999));
        assert!(record.is_expired(1_700_000_000));
        assert!(!Record::new(b"v".to_vec(), None).is_expired(i64::MAX));
    }

    #[test]
    fn test_record_wire_format() {
        let record = Record::new(b"hello".to_vec(), Some(1_700_000_000));
        let encoded = record.encode().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(json["value"], "aGVsbG8=");
        assert_eq!(json["expires"], 1_700_000_000);

        let without_expiry = Record::new(b"hello".to_vec(), None).encode().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&without_expiry).unwrap();
        assert!(json.get("expires").is_none());
    }

    #[test]
    fn test_record_decode_garbage() {
        assert!(matches!(
            Record::decode(b"not json"),
            Err(Error::Deserialization(_))
        ));
        assert!(matches!(
            Record::decode(br#"{"value":"***"}"#),
            Err(Error::Deserialization(_))
        ));
    }
}

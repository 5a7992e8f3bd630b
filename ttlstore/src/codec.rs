use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::{Error, Result};

/// Turns values into opaque bytes and back
pub trait Codec: Send + Sync + 'static {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// serde_json codec
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value)
            .map_err(|e| Error::Serialization(format!("Failed to encode value: {}", e)))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes)
            .map_err(|e| Error::Deserialization(format!("Failed to decode value: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_json_codec_shape_mismatch() {
        let bytes = JsonCodec.encode(&HashMap::from([("user", "alice")])).unwrap();

        let result: Result<Vec<u32>> = JsonCodec.decode(&bytes);
        assert!(matches!(result, Err(Error::Deserialization(_))));
    }

    #[test]
    fn test_json_codec_unserializable_value() {
        // JSON object keys must be strings
        let value = HashMap::from([(vec![1u8], 1u8)]);
        assert!(matches!(
            JsonCodec.encode(&value),
            Err(Error::Serialization(_))
        ));
    }
}

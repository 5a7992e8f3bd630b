// Public API
pub mod clock;
pub mod codec;
pub mod domain;
pub mod facade;
pub mod persistence;
pub mod ports;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{Codec, JsonCodec};
pub use domain::{Location, Record, MIN_EXPIRY};
pub use facade::TtlStore;
pub use persistence::sled_store::SledStore;
pub use ports::{StorageFactory, Store, StoreClient};
pub use shared::{Error, Result, UnixTime};

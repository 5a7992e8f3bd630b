pub mod sled_store;

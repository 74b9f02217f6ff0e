//! Adapters behind the domain ports: storage backends and token verification.

pub mod in_memory;
pub mod jwt;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;

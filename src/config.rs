//! Runtime configuration assembled from command-line arguments and environment.

use crate::application::engine::{DEFAULT_STORE_TIMEOUT, Storefront};
use crate::error::Result;
use crate::infrastructure::in_memory::{InMemoryItemStore, InMemoryOrderStore};
use crate::infrastructure::jwt::JwtConfig;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where items and orders are kept.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// RocksDB directory. In-memory storage is used when absent.
    pub db_path: Option<PathBuf>,
    pub store_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

impl StorageConfig {
    /// Opens the configured stores and builds the `Storefront` over them.
    pub fn open(&self) -> Result<Storefront> {
        let shop = match &self.db_path {
            #[cfg(feature = "storage-rocksdb")]
            Some(path) => {
                let store = crate::infrastructure::rocksdb::RocksDBStore::open(path)?;
                tracing::info!(path = %path.display(), "using RocksDB storage");
                Storefront::new(Box::new(store.clone()), Box::new(store))
            }
            #[cfg(not(feature = "storage-rocksdb"))]
            Some(path) => {
                tracing::warn!(
                    path = %path.display(),
                    "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
                );
                in_memory()
            }
            None => in_memory(),
        };
        Ok(shop.with_store_timeout(self.store_timeout))
    }
}

fn in_memory() -> Storefront {
    Storefront::new(
        Box::new(InMemoryItemStore::new()),
        Box::new(InMemoryOrderStore::new()),
    )
}

/// Settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub port: u16,
    pub jwt: JwtConfig,
    pub request_timeout: Duration,
    /// Catalog CSV loaded at startup.
    pub seed: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_storage_is_in_memory() {
        let shop = StorageConfig::default().open().unwrap();
        assert!(shop.list_items().await.unwrap().is_empty());
    }

    #[cfg(feature = "storage-rocksdb")]
    #[tokio::test]
    async fn test_rocksdb_storage_survives_reopen() {
        use crate::domain::identity::Identity;
        use crate::domain::item::ItemDraft;
        use serde_json::json;

        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            db_path: Some(dir.path().join("db")),
            ..Default::default()
        };

        {
            let shop = config.open().unwrap();
            shop.create_item(
                &Identity::system(),
                ItemDraft {
                    name: Some("Kettle".to_string()),
                    description: Some("Steel".to_string()),
                    price: Some(json!(20)),
                    image_url: Some("kettle.png".to_string()),
                    stock: Some(json!(2)),
                },
            )
            .await
            .unwrap();
        }

        let reopened = config.open().unwrap();
        let items = reopened.list_items().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Kettle");
    }
}

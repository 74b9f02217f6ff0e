use crate::domain::identity::UserId;
use crate::domain::item::{Item, ItemId};
use crate::domain::order::{Order, OrderId};
use crate::domain::ports::{ItemStore, OrderStore};
use crate::error::{Result, ShopError};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing catalog items.
pub const CF_ITEMS: &str = "items";
/// Column Family for storing orders.
pub const CF_ORDERS: &str = "orders";

/// A persistent store implementation using RocksDB.
///
/// Items and orders live in separate Column Families, keyed by the 16 raw bytes
/// of their UUID and stored as JSON.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("items" and "orders") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_items = ColumnFamilyDescriptor::new(CF_ITEMS, Options::default());
        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_items, cf_orders])?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Runs `op` on tokio's blocking pool. The returned future stays pending
    /// while the disk work is in progress, so timeouts around it can elapse.
    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&DB) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(&db))
            .await
            .map_err(|e| ShopError::InternalError(Box::new(e)))?
    }
}

fn cf<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily> {
    db.cf_handle(name)
        .ok_or_else(|| ShopError::internal(format!("{name} column family not found")))
}

fn read<T: DeserializeOwned>(db: &DB, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
    match db.get_cf(cf(db, cf_name)?, key)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

fn write<T: Serialize>(db: &DB, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value)?;
    db.put_cf(cf(db, cf_name)?, key, bytes)?;
    Ok(())
}

fn scan<T: DeserializeOwned>(db: &DB, cf_name: &str) -> Result<Vec<T>> {
    let mut values = Vec::new();
    for entry in db.iterator_cf(cf(db, cf_name)?, IteratorMode::Start) {
        let (_key, value) = entry?;
        values.push(serde_json::from_slice(&value)?);
    }
    Ok(values)
}

#[async_trait]
impl ItemStore for RocksDBStore {
    async fn store(&self, item: Item) -> Result<()> {
        self.blocking(move |db| write(db, CF_ITEMS, item.id.as_bytes(), &item))
            .await
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>> {
        self.blocking(move |db| read(db, CF_ITEMS, id.as_bytes()))
            .await
    }

    async fn get_all(&self) -> Result<Vec<Item>> {
        let mut items: Vec<Item> = self.blocking(|db| scan(db, CF_ITEMS)).await?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn remove(&self, id: ItemId) -> Result<Option<Item>> {
        self.blocking(move |db| {
            let existing: Option<Item> = read(db, CF_ITEMS, id.as_bytes())?;
            if existing.is_some() {
                db.delete_cf(cf(db, CF_ITEMS)?, id.as_bytes())?;
            }
            Ok(existing)
        })
        .await
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn store(&self, order: Order) -> Result<()> {
        self.blocking(move |db| write(db, CF_ORDERS, order.id.as_bytes(), &order))
            .await
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        self.blocking(move |db| read(db, CF_ORDERS, id.as_bytes()))
            .await
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self.blocking(|db| scan(db, CF_ORDERS)).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn get_by_customer(&self, customer: &UserId) -> Result<Vec<Order>> {
        let customer = customer.clone();
        let mut orders: Vec<Order> = self
            .blocking(move |db| {
                Ok(scan::<Order>(db, CF_ORDERS)?
                    .into_iter()
                    .filter(|o| o.customer.id == customer)
                    .collect())
            })
            .await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

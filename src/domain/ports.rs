use super::identity::{Identity, UserId};
use super::item::{Item, ItemId};
use super::order::{Order, OrderId};
use crate::error::Result;
use async_trait::async_trait;

/// Durable storage of catalog items.
///
/// `store` is an upsert keyed by `Item::id`. Callers that read-modify-write an
/// item must hold that item's lock; the store itself does no coordination.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn store(&self, item: Item) -> Result<()>;
    async fn get(&self, id: ItemId) -> Result<Option<Item>>;
    /// All items, most recently created first.
    async fn get_all(&self) -> Result<Vec<Item>>;
    async fn remove(&self, id: ItemId) -> Result<Option<Item>>;
}

/// Durable storage of orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn store(&self, order: Order) -> Result<()>;
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;
    /// All orders, most recently created first.
    async fn get_all(&self) -> Result<Vec<Order>>;
    /// Orders placed by `customer`, most recently created first.
    async fn get_by_customer(&self, customer: &UserId) -> Result<Vec<Order>>;
}

/// Verifies bearer credentials issued by an external identity provider.
pub trait IdentityProvider: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity>;
}

pub type ItemStoreBox = Box<dyn ItemStore>;
pub type OrderStoreBox = Box<dyn OrderStore>;

use crate::domain::identity::UserId;
use crate::domain::item::{Item, ItemId};
use crate::domain::order::{Order, OrderId};
use crate::domain::ports::{ItemStore, OrderStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for catalog items.
///
/// Uses `Arc<RwLock<HashMap<ItemId, Item>>>` to allow shared concurrent access.
/// Used when no database path is configured and throughout the tests.
#[derive(Default, Clone)]
pub struct InMemoryItemStore {
    items: Arc<RwLock<HashMap<ItemId, Item>>>,
}

impl InMemoryItemStore {
    /// Creates a new, empty in-memory item store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn store(&self, item: Item) -> Result<()> {
        let mut items = self.items.write().await;
        items.insert(item.id, item);
        Ok(())
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>> {
        let items = self.items.read().await;
        Ok(items.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Item>> {
        let items = self.items.read().await;
        let mut all: Vec<Item> = items.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn remove(&self, id: ItemId) -> Result<Option<Item>> {
        let mut items = self.items.write().await;
        Ok(items.remove(&id))
    }
}

/// A thread-safe in-memory store for orders.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn store(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id, order);
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut all: Vec<Order> = orders.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn get_by_customer(&self, customer: &UserId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut mine: Vec<Order> = orders
            .values()
            .filter(|o| &o.customer.id == customer)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::{Identity, Role};
    use crate::domain::item::{ItemDraft, Quantity};
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn item(name: &str, age_minutes: i64) -> Item {
        let new = ItemDraft {
            name: Some(name.to_string()),
            description: Some("desc".to_string()),
            price: Some(json!(1.00)),
            image_url: Some("img".to_string()),
            stock: Some(json!(5)),
        }
        .validate()
        .unwrap();
        Item::create(
            new,
            UserId::new("v1"),
            Utc::now() - Duration::minutes(age_minutes),
        )
    }

    #[tokio::test]
    async fn test_in_memory_item_store() {
        let store = InMemoryItemStore::new();
        let mug = item("mug", 0);

        store.store(mug.clone()).await.unwrap();
        let retrieved = store.get(mug.id).await.unwrap().unwrap();
        assert_eq!(retrieved, mug);

        assert!(store.get(ItemId::new()).await.unwrap().is_none());

        let removed = store.remove(mug.id).await.unwrap().unwrap();
        assert_eq!(removed.id, mug.id);
        assert!(store.get(mug.id).await.unwrap().is_none());
        assert!(store.remove(mug.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_items_newest_first() {
        let store = InMemoryItemStore::new();
        store.store(item("oldest", 30)).await.unwrap();
        store.store(item("newest", 0)).await.unwrap();
        store.store(item("middle", 10)).await.unwrap();

        let names: Vec<String> = store
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["newest", "middle", "oldest"]);
    }

    #[tokio::test]
    async fn test_in_memory_order_store_filters_by_customer() {
        let store = InMemoryOrderStore::new();
        let alice = Identity::new("alice", Role::Customer);
        let bob = Identity::new("bob", Role::Customer);
        let qty = Quantity::new(1).unwrap();

        let first = Order::place(&alice, ItemId::new(), qty, Utc::now() - Duration::minutes(5));
        let second = Order::place(&alice, ItemId::new(), qty, Utc::now());
        let other = Order::place(&bob, ItemId::new(), qty, Utc::now());
        for o in [&first, &second, &other] {
            store.store(o.clone()).await.unwrap();
        }

        let mine = store.get_by_customer(&alice.user_id).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, second.id);
        assert_eq!(mine[1].id, first.id);

        assert_eq!(store.get_all().await.unwrap().len(), 3);
        assert_eq!(store.get(other.id).await.unwrap().unwrap(), other);
    }
}

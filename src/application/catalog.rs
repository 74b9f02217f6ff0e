use crate::application::engine::Storefront;
use crate::application::policy;
use crate::domain::identity::{Identity, Role};
use crate::domain::item::{Item, ItemChanges, ItemDraft, ItemId, ItemPatch, Stock};
use crate::error::{Result, ShopError};
use chrono::Utc;
use tracing::info;

impl Storefront {
    /// All catalog items, newest first.
    pub async fn list_items(&self) -> Result<Vec<Item>> {
        self.bounded(self.item_store.get_all()).await
    }

    pub async fn get_item(&self, id: &str) -> Result<Item> {
        let id: ItemId = id.parse()?;
        self.load_item(id).await
    }

    pub async fn create_item(&self, vendor: &Identity, draft: ItemDraft) -> Result<Item> {
        policy::require_role(vendor, Role::Vendor)?;
        let new = draft.validate()?;
        let item = Item::create(new, vendor.user_id.clone(), Utc::now());
        self.bounded(self.item_store.store(item.clone())).await?;
        info!(item_id = %item.id, name = %item.name, stock = item.stock.value(), "item created");
        Ok(item)
    }

    /// Applies a vendor's partial update.
    ///
    /// Direct stock edits take the item's lock so they cannot interleave with
    /// an order or checkout in flight.
    pub async fn update_item(&self, vendor: &Identity, id: &str, patch: ItemPatch) -> Result<Item> {
        policy::require_role(vendor, Role::Vendor)?;
        let changes = patch.validate()?;
        let id: ItemId = id.parse()?;

        let guard = self.item_locks.lock(id).await;
        let updated = self.apply_changes(id, changes).await;
        drop(guard);
        let (item, old_stock) = match updated {
            Ok(updated) => updated,
            Err(e) => {
                self.item_locks.forget(id);
                return Err(e);
            }
        };

        if old_stock != item.stock {
            info!(
                item_id = %item.id,
                old_stock = old_stock.value(),
                new_stock = item.stock.value(),
                "stock set by vendor"
            );
        }
        Ok(item)
    }

    async fn apply_changes(&self, id: ItemId, changes: ItemChanges) -> Result<(Item, Stock)> {
        let mut item = self.load_item(id).await?;
        let old_stock = item.stock;
        item.apply(changes, Utc::now());
        self.bounded(self.item_store.store(item.clone())).await?;
        Ok((item, old_stock))
    }

    pub async fn delete_item(&self, vendor: &Identity, id: &str) -> Result<Item> {
        policy::require_role(vendor, Role::Vendor)?;
        let id: ItemId = id.parse()?;

        let removed = {
            let _guard = self.item_locks.lock(id).await;
            self.bounded(self.item_store.remove(id))
                .await?
                .ok_or_else(|| ShopError::item_not_found(id))?
        };
        self.item_locks.forget(id);

        info!(item_id = %removed.id, name = %removed.name, "item deleted");
        Ok(removed)
    }
}

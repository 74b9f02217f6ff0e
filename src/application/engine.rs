use crate::application::locks::KeyedLocks;
use crate::application::policy;
use crate::domain::identity::{Identity, Role};
use crate::domain::item::{Item, ItemId, Quantity};
use crate::domain::order::{
    CheckoutDraft, CheckoutReceipt, Order, OrderDraft, OrderId, OrderView, StockChange,
};
use crate::domain::ports::{ItemStoreBox, OrderStoreBox};
use crate::error::{Result, ShopError};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

/// Upper bound on a single store call unless configured otherwise.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

pub const CHECKOUT_MESSAGE: &str = "Checkout successful! Stock has been updated.";

/// The application entry point for catalog, stock and order operations.
///
/// `Storefront` owns the storage backends and is the only component that lowers
/// stock in response to a purchase. Every read-check-write of an item's stock
/// runs under that item's lock, so concurrent purchases of the same item are
/// applied one after another and can never overdraw it.
pub struct Storefront {
    pub(super) item_store: ItemStoreBox,
    pub(super) order_store: OrderStoreBox,
    pub(super) item_locks: KeyedLocks<ItemId>,
    pub(super) order_locks: KeyedLocks<OrderId>,
    store_timeout: Duration,
}

impl Storefront {
    /// Creates a new `Storefront` over the given stores.
    pub fn new(item_store: ItemStoreBox, order_store: OrderStoreBox) -> Self {
        Self {
            item_store,
            order_store,
            item_locks: KeyedLocks::new(),
            order_locks: KeyedLocks::new(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Runs a store call under the store timeout.
    ///
    /// An elapsed deadline is reported as the transient `ShopError::Timeout`;
    /// nothing is retried here.
    pub(super) async fn bounded<T>(&self, op: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.store_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(ShopError::Timeout),
        }
    }

    pub(super) async fn load_item(&self, id: ItemId) -> Result<Item> {
        self.bounded(self.item_store.get(id))
            .await?
            .ok_or_else(|| ShopError::item_not_found(id))
    }

    /// Places a single-item order for a customer, decrementing the item's stock.
    ///
    /// The stock check, the decrement and the order record happen under the
    /// item's lock. If the order cannot be persisted the item is put back to
    /// its previous state.
    pub async fn place_order(&self, customer: &Identity, draft: OrderDraft) -> Result<OrderView> {
        policy::require_role(customer, Role::Customer)?;
        let (raw_id, quantity) = draft.validate()?;
        let item_id: ItemId = raw_id.parse()?;

        let guard = self.item_locks.lock(item_id).await;

        let snapshot = match self.load_item(item_id).await {
            Ok(item) => item,
            Err(e) => {
                drop(guard);
                self.item_locks.forget(item_id);
                return Err(e);
            }
        };
        let now = Utc::now();
        let mut item = snapshot.clone();
        item.withdraw(quantity, now)?;

        if let Err(e) = self.bounded(self.item_store.store(item.clone())).await {
            self.restore(std::slice::from_ref(&snapshot)).await;
            return Err(e);
        }

        let order = Order::place(customer, item_id, quantity, now);
        if let Err(e) = self.bounded(self.order_store.store(order.clone())).await {
            error!(item_id = %item_id, error = %e, "failed to persist order, restoring stock");
            self.restore(std::slice::from_ref(&snapshot)).await;
            return Err(e);
        }

        info!(
            order_id = %order.id,
            item_id = %item_id,
            customer = %customer.user_id,
            quantity = quantity.value(),
            old_stock = snapshot.stock.value(),
            new_stock = item.stock.value(),
            "order placed"
        );

        Ok(OrderView::join(order, Some(item)))
    }

    /// Decrements stock for every line of a batch, all or nothing.
    ///
    /// Locks for every item in the batch are taken up front in id order and
    /// held for the whole operation. Nothing is written until every line has
    /// passed its existence and stock check; a failed write during the commit
    /// pass restores every item touched so far.
    pub async fn checkout(&self, draft: CheckoutDraft) -> Result<CheckoutReceipt> {
        let demand = merge_lines(draft.validate()?)?;

        let guards = self
            .item_locks
            .lock_all(demand.iter().map(|(id, _)| *id))
            .await;

        let now = Utc::now();
        let staged = match self.stage(&demand, now).await {
            Ok(staged) => staged,
            Err(e) => {
                drop(guards);
                for (id, _) in &demand {
                    self.item_locks.forget(*id);
                }
                return Err(e);
            }
        };

        let mut changes = Vec::with_capacity(staged.len());
        for (i, (snapshot, updated)) in staged.iter().enumerate() {
            if let Err(e) = self.bounded(self.item_store.store(updated.clone())).await {
                error!(item_id = %updated.id, error = %e, "checkout commit failed, rolling back");
                let touched: Vec<Item> = staged[..=i].iter().map(|(s, _)| s.clone()).collect();
                self.restore(&touched).await;
                return Err(e);
            }
            info!(
                item_id = %updated.id,
                name = %updated.name,
                old_stock = snapshot.stock.value(),
                new_stock = updated.stock.value(),
                "stock updated"
            );
            changes.push(StockChange {
                item_id: updated.id,
                name: updated.name.clone(),
                previous_stock: snapshot.stock.value(),
                stock: updated.stock.value(),
            });
        }

        Ok(CheckoutReceipt {
            message: CHECKOUT_MESSAGE.to_string(),
            success: true,
            items: changes,
        })
    }

    /// Pre-validation pass: loads each item and applies its withdrawal in memory.
    /// Returns `(snapshot, updated)` pairs in request order.
    async fn stage(
        &self,
        demand: &[(ItemId, Quantity)],
        now: DateTime<Utc>,
    ) -> Result<Vec<(Item, Item)>> {
        let mut staged = Vec::with_capacity(demand.len());
        for (item_id, quantity) in demand {
            let snapshot = self.load_item(*item_id).await?;
            let mut updated = snapshot.clone();
            updated.withdraw(*quantity, now)?;
            staged.push((snapshot, updated));
        }
        Ok(staged)
    }

    /// Writes the given snapshots back, newest change first. Caller holds the locks.
    async fn restore(&self, snapshots: &[Item]) {
        for snapshot in snapshots.iter().rev() {
            match self.bounded(self.item_store.store(snapshot.clone())).await {
                Ok(()) => warn!(
                    item_id = %snapshot.id,
                    stock = snapshot.stock.value(),
                    "stock restored"
                ),
                Err(e) => error!(item_id = %snapshot.id, error = %e, "failed to restore stock"),
            }
        }
    }
}

/// Resolves item ids and sums quantities of lines naming the same item,
/// keeping first-seen order.
fn merge_lines(lines: Vec<(String, Quantity)>) -> Result<Vec<(ItemId, Quantity)>> {
    let mut merged: Vec<(ItemId, Quantity)> = Vec::with_capacity(lines.len());
    for (raw_id, quantity) in lines {
        let id: ItemId = raw_id.parse()?;
        match merged.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, total)) => {
                *total = total.checked_add(quantity).ok_or_else(|| {
                    ShopError::invalid("items", format!("Quantity for item {id} is too large"))
                })?;
            }
            None => merged.push((id, quantity)),
        }
    }
    Ok(merged)
}

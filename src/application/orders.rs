use crate::application::engine::Storefront;
use crate::application::policy;
use crate::domain::identity::{Identity, Role};
use crate::domain::order::{Order, OrderId, OrderStatus, OrderView};
use crate::error::{Result, ShopError};
use tracing::info;

impl Storefront {
    /// Orders visible to the caller, newest first.
    pub async fn list_orders(&self, identity: &Identity) -> Result<Vec<OrderView>> {
        let orders = match identity.role {
            Role::Vendor => self.bounded(self.order_store.get_all()).await?,
            Role::Customer => {
                self.bounded(self.order_store.get_by_customer(&identity.user_id))
                    .await?
            }
        };

        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            views.push(self.view(order).await?);
        }
        Ok(views)
    }

    pub async fn get_order(&self, identity: &Identity, id: &str) -> Result<OrderView> {
        let id: OrderId = id.parse()?;
        let order = self.load_order(id).await?;
        if !policy::can_view_order(identity, &order) {
            return Err(ShopError::Forbidden(
                "Order belongs to another customer".to_string(),
            ));
        }
        self.view(order).await
    }

    /// Moves an order to `status`. Vendors only; no stock side effects.
    pub async fn set_order_status(
        &self,
        vendor: &Identity,
        id: &str,
        status: Option<&str>,
    ) -> Result<OrderView> {
        policy::require_role(vendor, Role::Vendor)?;
        let next: OrderStatus = status
            .ok_or_else(|| ShopError::invalid("status", "Invalid status"))?
            .parse()?;
        let id: OrderId = id.parse()?;

        let guard = self.order_locks.lock(id).await;
        let transitioned = self.transition(id, next).await;
        drop(guard);
        // Orders are never removed, so entries are only kept while contended.
        self.order_locks.forget(id);

        self.view(transitioned?).await
    }

    async fn transition(&self, id: OrderId, next: OrderStatus) -> Result<Order> {
        let mut order = self.load_order(id).await?;
        let previous = order.status;
        order.status = previous.transition_to(next)?;

        if order.status != previous {
            self.bounded(self.order_store.store(order.clone())).await?;
            info!(order_id = %order.id, from = %previous, to = %order.status, "order status changed");
        }
        Ok(order)
    }

    async fn load_order(&self, id: OrderId) -> Result<Order> {
        self.bounded(self.order_store.get(id))
            .await?
            .ok_or_else(|| ShopError::order_not_found(id))
    }

    /// Joins an order with the current state of its item.
    async fn view(&self, order: Order) -> Result<OrderView> {
        let item = self.bounded(self.item_store.get(order.item_id)).await?;
        Ok(OrderView::join(order, item))
    }
}

//! Role checks and order visibility.

use crate::domain::identity::{Identity, Role};
use crate::domain::order::Order;
use crate::error::{Result, ShopError};

/// Fails with `Forbidden` unless the caller holds `role`.
pub fn require_role(identity: &Identity, role: Role) -> Result<()> {
    if identity.role == role {
        Ok(())
    } else {
        Err(ShopError::Forbidden(format!("{} role required", capitalize(role))))
    }
}

/// Vendors see every order; customers only their own.
pub fn can_view_order(identity: &Identity, order: &Order) -> bool {
    match identity.role {
        Role::Vendor => true,
        Role::Customer => order.customer.id == identity.user_id,
    }
}

fn capitalize(role: Role) -> &'static str {
    match role {
        Role::Vendor => "Vendor",
        Role::Customer => "Customer",
    }
}

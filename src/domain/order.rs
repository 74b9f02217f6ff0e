use crate::domain::identity::{Identity, UserId};
use crate::domain::item::{Item, ItemId, Quantity};
use crate::error::{FieldError, Result, ShopError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for OrderId {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ShopError::order_not_found(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Returns the status after moving to `next`.
    ///
    /// Re-applying the current status is a no-op; terminal states cannot be left.
    pub fn transition_to(self, next: OrderStatus) -> Result<OrderStatus> {
        if self == next {
            Ok(self)
        } else if self.is_terminal() {
            Err(ShopError::invalid(
                "status",
                format!("Cannot change order status from {self} to {next}"),
            ))
        } else {
            Ok(next)
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl FromStr for OrderStatus {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(ShopError::invalid("status", "Invalid status")),
        }
    }
}

/// Who placed an order, as captured at placement time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: UserId,
    pub email: Option<String>,
}

impl From<&Identity> for CustomerSummary {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.user_id.clone(),
            email: identity.email.clone(),
        }
    }
}

/// A persisted purchase of a single item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer: CustomerSummary,
    pub item_id: ItemId,
    pub quantity: Quantity,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn place(customer: &Identity, item_id: ItemId, quantity: Quantity, now: DateTime<Utc>) -> Self {
        Self {
            id: OrderId::new(),
            customer: CustomerSummary::from(customer),
            item_id,
            quantity,
            status: OrderStatus::Pending,
            created_at: now,
        }
    }
}

/// An order joined with its item and customer, as returned to callers.
///
/// `item` is `None` when the item has since been removed from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub customer: CustomerSummary,
    pub item_id: ItemId,
    pub item: Option<Item>,
    pub quantity: Quantity,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderView {
    pub fn join(order: Order, item: Option<Item>) -> Self {
        Self {
            id: order.id,
            customer: order.customer,
            item_id: order.item_id,
            item,
            quantity: order.quantity,
            status: order.status,
            created_at: order.created_at,
        }
    }
}

/// Raw single-item order request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub item_id: Option<String>,
    /// Checked for a whole positive number in `validate`.
    pub quantity: Option<Value>,
}

impl OrderDraft {
    /// Checks presence and shape; returns the raw item id and the quantity.
    pub fn validate(self) -> Result<(String, Quantity)> {
        let mut errors = Vec::new();
        let item_id = present_id(self.item_id, "itemId", &mut errors);
        let quantity = positive_quantity(self.quantity, "quantity", &mut errors);
        match (item_id, quantity) {
            (Some(item_id), Some(quantity)) => Ok((item_id, quantity)),
            _ => Err(ShopError::ValidationError(errors)),
        }
    }
}

/// Raw line of a batch checkout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLineDraft {
    pub item_id: Option<String>,
    pub quantity: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutDraft {
    pub items: Option<Vec<CheckoutLineDraft>>,
}

impl CheckoutDraft {
    /// Validates the whole batch, reporting each failing line by index.
    pub fn validate(self) -> Result<Vec<(String, Quantity)>> {
        let lines = match self.items {
            Some(lines) if !lines.is_empty() => lines,
            Some(_) => return Err(ShopError::invalid("items", "Items must not be empty")),
            None => return Err(ShopError::invalid("items", "Items must be an array")),
        };

        let mut errors = Vec::new();
        let mut valid = Vec::with_capacity(lines.len());
        for (i, line) in lines.into_iter().enumerate() {
            let item_id = present_id(line.item_id, &format!("items[{i}].itemId"), &mut errors);
            let quantity =
                positive_quantity(line.quantity, &format!("items[{i}].quantity"), &mut errors);
            if let (Some(item_id), Some(quantity)) = (item_id, quantity) {
                valid.push((item_id, quantity));
            }
        }

        if errors.is_empty() {
            Ok(valid)
        } else {
            Err(ShopError::ValidationError(errors))
        }
    }
}

/// Confirmation of a completed checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub message: String,
    pub success: bool,
    pub items: Vec<StockChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub item_id: ItemId,
    pub name: String,
    pub previous_stock: u32,
    pub stock: u32,
}

fn present_id(value: Option<String>, field: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    match value {
        Some(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
        _ => {
            errors.push(FieldError::new(field, "Item ID is required"));
            None
        }
    }
}

fn positive_quantity(
    value: Option<Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Quantity> {
    match value.as_ref().and_then(Value::as_i64).map(Quantity::try_from) {
        Some(Ok(quantity)) => Some(quantity),
        _ => {
            errors.push(FieldError::new(field, "Quantity must be a positive integer"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::Role;
    use serde_json::json;

    #[test]
    fn test_status_transitions() {
        use OrderStatus::*;
        assert_eq!(Pending.transition_to(Completed).unwrap(), Completed);
        assert_eq!(Pending.transition_to(Cancelled).unwrap(), Cancelled);
        assert_eq!(Completed.transition_to(Completed).unwrap(), Completed);
        assert!(Completed.transition_to(Pending).is_err());
        assert!(Cancelled.transition_to(Completed).is_err());
        assert!(Cancelled.is_terminal());
        assert!(!Pending.is_terminal());
    }

    #[test]
    fn test_unknown_status_is_a_validation_error() {
        assert!(matches!(
            "shipped".parse::<OrderStatus>(),
            Err(ShopError::ValidationError(_))
        ));
        assert_eq!("cancelled".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_order_draft_validation() {
        let (id, qty) = OrderDraft {
            item_id: Some("abc".to_string()),
            quantity: Some(json!(3)),
        }
        .validate()
        .unwrap();
        assert_eq!(id, "abc");
        assert_eq!(qty.value(), 3);

        let err = OrderDraft {
            item_id: None,
            quantity: Some(json!(0)),
        }
        .validate()
        .unwrap_err();
        match err {
            ShopError::ValidationError(errors) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].field, "itemId");
                assert_eq!(errors[1].field, "quantity");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_checkout_draft_reports_line_indices() {
        let err = CheckoutDraft {
            items: Some(vec![
                CheckoutLineDraft {
                    item_id: Some("a".to_string()),
                    quantity: Some(json!(1)),
                },
                CheckoutLineDraft {
                    item_id: Some(" ".to_string()),
                    quantity: Some(json!(-1)),
                },
            ]),
        }
        .validate()
        .unwrap_err();
        match err {
            ShopError::ValidationError(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["items[1].itemId", "items[1].quantity"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_non_integer_quantities_are_field_errors() {
        let err = CheckoutDraft {
            items: Some(vec![
                CheckoutLineDraft {
                    item_id: Some("a".to_string()),
                    quantity: Some(json!("2")),
                },
                CheckoutLineDraft {
                    item_id: None,
                    quantity: Some(json!(1.5)),
                },
            ]),
        }
        .validate()
        .unwrap_err();
        match err {
            ShopError::ValidationError(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(
                    fields,
                    vec!["items[0].quantity", "items[1].itemId", "items[1].quantity"]
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_checkout_draft_rejects_empty_batch() {
        assert!(CheckoutDraft { items: Some(vec![]) }.validate().is_err());
        assert!(CheckoutDraft { items: None }.validate().is_err());
    }

    #[test]
    fn test_placed_order_is_pending() {
        let who = Identity::new("c1", Role::Customer).with_email("c1@example.com");
        let order = Order::place(&who, ItemId::new(), Quantity::new(2).unwrap(), Utc::now());
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.customer.email.as_deref(), Some("c1@example.com"));
    }
}

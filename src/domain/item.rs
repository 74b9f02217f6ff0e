use crate::domain::identity::UserId;
use crate::error::{FieldError, Result, ShopError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ItemId {
    type Err = ShopError;

    /// A malformed identifier can never name a stored item, so it reads as absent.
    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ShopError::item_not_found(s))
    }
}

/// Unit price of an item. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    pub fn new(value: Decimal) -> Result<Self> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(ShopError::invalid(
                "price",
                "Price must be a non-negative number",
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

/// Units requested by an order line. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(ShopError::invalid(
                "quantity",
                "Quantity must be a positive integer",
            ))
        }
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = ShopError;

    fn try_from(value: i64) -> Result<Self> {
        u32::try_from(value)
            .map_err(|_| ShopError::invalid("quantity", "Quantity must be a positive integer"))
            .and_then(Self::new)
    }
}

/// Units on hand. The unsigned representation makes a negative stock unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stock(u32);

impl Stock {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn covers(&self, quantity: Quantity) -> bool {
        self.0 >= quantity.0
    }

    pub fn checked_sub(self, quantity: Quantity) -> Option<Self> {
        self.0.checked_sub(quantity.0).map(Self)
    }
}

impl TryFrom<i64> for Stock {
    type Error = ShopError;

    fn try_from(value: i64) -> Result<Self> {
        u32::try_from(value)
            .map(Self)
            .map_err(|_| ShopError::invalid("stock", "Stock must be a non-negative integer"))
    }
}

/// A sellable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub stock: Stock,
    /// The vendor that created the item.
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn create(new: NewItem, owner: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: ItemId::new(),
            name: new.name,
            description: new.description,
            price: new.price,
            image_url: new.image_url,
            stock: new.stock,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: ItemChanges, now: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(image_url) = changes.image_url {
            self.image_url = image_url;
        }
        if let Some(stock) = changes.stock {
            self.stock = stock;
        }
        self.updated_at = now;
    }

    /// Removes `quantity` units from stock, refusing to overdraw.
    pub fn withdraw(&mut self, quantity: Quantity, now: DateTime<Utc>) -> Result<()> {
        match self.stock.checked_sub(quantity) {
            Some(remaining) => {
                self.stock = remaining;
                self.updated_at = now;
                Ok(())
            }
            None => Err(ShopError::InsufficientStock {
                item_id: self.id.to_string(),
                name: self.name.clone(),
                available: self.stock.value(),
                requested: quantity.value(),
            }),
        }
    }
}

/// Item fields as submitted by a client, before validation.
///
/// Numeric fields stay untyped until `validate` so a value of the wrong JSON
/// type is reported against its field alongside every other failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub image_url: Option<String>,
    pub stock: Option<Value>,
}

/// A fully validated item ready to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub stock: Stock,
}

impl ItemDraft {
    /// Validates every field and reports all failures at once.
    pub fn validate(self) -> Result<NewItem> {
        let mut errors = Vec::new();

        let name = required_text(self.name, "name", "Name is required", &mut errors);
        let description = required_text(
            self.description,
            "description",
            "Description is required",
            &mut errors,
        );
        let image_url = required_text(
            self.image_url,
            "imageUrl",
            "Image URL is required",
            &mut errors,
        );
        let price = match self.price {
            Some(value) => price_field(&value, &mut errors),
            None => {
                errors.push(FieldError::new("price", "Price is required"));
                None
            }
        };
        let stock = match self.stock {
            Some(value) => stock_field(&value, &mut errors),
            None => {
                errors.push(FieldError::new("stock", "Stock is required"));
                None
            }
        };

        match (name, description, price, image_url, stock) {
            (Some(name), Some(description), Some(price), Some(image_url), Some(stock))
                if errors.is_empty() =>
            {
                Ok(NewItem {
                    name,
                    description,
                    price,
                    image_url,
                    stock,
                })
            }
            _ => Err(ShopError::ValidationError(errors)),
        }
    }
}

/// Partial update submitted by a vendor. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub image_url: Option<String>,
    pub stock: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub image_url: Option<String>,
    pub stock: Option<Stock>,
}

impl ItemPatch {
    pub fn validate(self) -> Result<ItemChanges> {
        let mut errors = Vec::new();

        let name = self
            .name
            .and_then(|v| non_empty(v, "name", "Name cannot be empty", &mut errors));
        let description = self.description.and_then(|v| {
            non_empty(v, "description", "Description cannot be empty", &mut errors)
        });
        let image_url = self
            .image_url
            .and_then(|v| non_empty(v, "imageUrl", "Image URL cannot be empty", &mut errors));
        let price = self.price.and_then(|v| price_field(&v, &mut errors));
        let stock = self.stock.and_then(|v| stock_field(&v, &mut errors));

        if errors.is_empty() {
            Ok(ItemChanges {
                name,
                description,
                price,
                image_url,
                stock,
            })
        } else {
            Err(ShopError::ValidationError(errors))
        }
    }
}

fn required_text(
    value: Option<String>,
    field: &str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value {
        Some(v) => non_empty(v, field, message, errors),
        None => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

fn non_empty(
    value: String,
    field: &str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new(field, message));
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Accepts a JSON number or a numeric string, as prices are written back as strings.
fn price_field(value: &Value, errors: &mut Vec<FieldError>) -> Option<Price> {
    let decimal = match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    };
    match decimal {
        Some(decimal) => collect(Price::new(decimal), errors),
        None => {
            errors.push(FieldError::new("price", "Price must be a non-negative number"));
            None
        }
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Whole JSON numbers only; `2.5` and `"2"` are rejected.
fn stock_field(value: &Value, errors: &mut Vec<FieldError>) -> Option<Stock> {
    match value.as_i64() {
        Some(n) => collect(Stock::try_from(n), errors),
        None => {
            errors.push(FieldError::new("stock", "Stock must be a non-negative integer"));
            None
        }
    }
}

fn collect<T>(result: Result<T>, errors: &mut Vec<FieldError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(ShopError::ValidationError(mut fields)) => {
            errors.append(&mut fields);
            None
        }
        Err(other) => {
            errors.push(FieldError::new("unknown", other.to_string()));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn draft() -> ItemDraft {
        ItemDraft {
            name: Some("  Clay mug ".to_string()),
            description: Some("Hand thrown".to_string()),
            price: Some(json!("12.50")),
            image_url: Some("https://img.example/mug.png".to_string()),
            stock: Some(json!(10)),
        }
    }

    fn fields(err: ShopError) -> Vec<String> {
        match err {
            ShopError::ValidationError(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_draft_validation_trims_name() {
        let new = draft().validate().unwrap();
        assert_eq!(new.name, "Clay mug");
        assert_eq!(new.stock, Stock::new(10));
        assert_eq!(new.price.value(), dec!(12.50));
    }

    #[test]
    fn test_draft_validation_reports_every_field() {
        let err = ItemDraft {
            name: Some("   ".to_string()),
            description: None,
            price: Some(json!(-1)),
            image_url: None,
            stock: Some(json!(-3)),
        }
        .validate()
        .unwrap_err();

        assert_eq!(
            fields(err),
            vec!["name", "description", "imageUrl", "price", "stock"]
        );
    }

    #[test]
    fn test_zero_price_and_stock_are_allowed() {
        let mut d = draft();
        d.price = Some(json!(0));
        d.stock = Some(json!(0));
        let new = d.validate().unwrap();
        assert_eq!(new.stock, Stock::ZERO);
    }

    #[test]
    fn test_patch_only_checks_present_fields() {
        let changes = ItemPatch {
            stock: Some(json!(4)),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(changes.stock, Some(Stock::new(4)));
        assert!(changes.name.is_none());

        let err = ItemPatch {
            description: Some(String::new()),
            price: Some(json!(-0.01)),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(fields(err), vec!["description", "price"]);
    }

    #[test]
    fn test_wrong_json_types_are_field_errors() {
        let err = ItemDraft {
            name: Some(String::new()),
            description: Some("ok".to_string()),
            price: Some(json!([1])),
            image_url: Some("x.png".to_string()),
            stock: Some(json!(2.5)),
        }
        .validate()
        .unwrap_err();
        assert_eq!(fields(err), vec!["name", "price", "stock"]);

        let err = ItemPatch {
            stock: Some(json!("7")),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(fields(err), vec!["stock"]);
    }

    #[test]
    fn test_price_accepts_numbers_and_numeric_strings() {
        let mut d = draft();
        d.price = Some(json!(49.99));
        assert_eq!(d.clone().validate().unwrap().price.value(), dec!(49.99));
        d.price = Some(json!(" 3.10 "));
        assert_eq!(d.validate().unwrap().price.value(), dec!(3.10));
    }

    #[test]
    fn test_quantity_rejects_zero_and_negative() {
        assert!(Quantity::try_from(1).is_ok());
        assert!(matches!(
            Quantity::try_from(0),
            Err(ShopError::ValidationError(_))
        ));
        assert!(matches!(
            Quantity::try_from(-2),
            Err(ShopError::ValidationError(_))
        ));
    }

    #[test]
    fn test_withdraw_never_overdraws() {
        let now = Utc::now();
        let mut item = Item::create(draft().validate().unwrap(), UserId::new("v1"), now);

        item.withdraw(Quantity::new(4).unwrap(), now).unwrap();
        assert_eq!(item.stock, Stock::new(6));

        let err = item.withdraw(Quantity::new(7).unwrap(), now).unwrap_err();
        assert!(matches!(
            err,
            ShopError::InsufficientStock {
                available: 6,
                requested: 7,
                ..
            }
        ));
        assert_eq!(item.stock, Stock::new(6));
    }

    #[test]
    fn test_malformed_item_id_reads_as_not_found() {
        assert!(matches!(
            "not-a-uuid".parse::<ItemId>(),
            Err(ShopError::NotFound { entity: "Item", .. })
        ));
    }

    #[test]
    fn test_item_serializes_camel_case() {
        let item = Item::create(draft().validate().unwrap(), UserId::new("v1"), Utc::now());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["imageUrl"], "https://img.example/mug.png");
        assert_eq!(json["stock"], 10);
        assert_eq!(json["owner"], "v1");
        assert!(json.get("createdAt").is_some());
    }
}

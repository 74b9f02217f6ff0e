use crate::domain::item::ItemDraft;
use crate::error::{Result, ShopError};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;

/// One catalog row as laid out in an import file.
#[derive(Debug, Deserialize)]
struct ItemRow {
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    image_url: Option<String>,
    stock: Option<i64>,
}

impl From<ItemRow> for ItemDraft {
    fn from(row: ItemRow) -> Self {
        ItemDraft {
            name: row.name,
            description: row.description,
            price: row.price.map(|p| Value::String(p.to_string())),
            image_url: row.image_url,
            stock: row.stock.map(Value::from),
        }
    }
}

/// Reads catalog items from a CSV source with the header
/// `name,description,price,image_url,stock`.
///
/// Rows are only parsed here; field validation happens when the draft is
/// turned into an item, so a bad row is reported with every failing field.
pub struct ItemReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ItemReader<R> {
    /// Creates a new `ItemReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes rows.
    pub fn drafts(self) -> impl Iterator<Item = Result<ItemDraft>> {
        self.reader
            .into_deserialize::<ItemRow>()
            .map(|result| result.map(ItemDraft::from).map_err(ShopError::from))
    }
}

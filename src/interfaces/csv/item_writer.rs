use crate::domain::item::Item;
use crate::error::Result;
use std::io::Write;

/// Writes catalog items as CSV, one row per item.
pub struct ItemWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ItemWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_items(&mut self, items: impl IntoIterator<Item = Item>) -> Result<()> {
        self.writer
            .write_record(["id", "name", "price", "stock", "owner", "created_at"])?;
        for item in items {
            self.writer.write_record([
                item.id.to_string(),
                item.name,
                item.price.value().normalize().to_string(),
                item.stock.value().to_string(),
                item.owner.to_string(),
                item.created_at.to_rfc3339(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

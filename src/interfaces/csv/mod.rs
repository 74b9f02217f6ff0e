//! Catalog import and export in CSV form.

pub mod item_reader;
pub mod item_writer;

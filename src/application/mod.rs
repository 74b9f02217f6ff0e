//! Application layer containing the business operations.
//!
//! `Storefront` is the single entry point used by every interface. Its
//! operations are split by concern: stock movements live in `engine`, catalog
//! maintenance in `catalog` and the order lifecycle in `orders`.

pub mod catalog;
pub mod engine;
pub mod locks;
pub mod orders;
pub mod policy;

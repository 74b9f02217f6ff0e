//! Domain model: catalog items, orders, caller identities and the storage ports
//! the application layer depends on.

pub mod identity;
pub mod item;
pub mod order;
pub mod ports;

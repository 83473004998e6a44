//! Storage boundary.
//!
//! Reads go through a `StoreReader`; every write goes through a `UnitOfWork`
//! that either commits as a whole or is discarded.

pub mod in_memory;
pub mod tables;
pub mod r#trait;

pub use in_memory::{InMemoryStore, InMemoryUnitOfWork};
pub use r#trait::{InventoryStore, StoreReader, UnitOfWork};
pub use tables::Tables;

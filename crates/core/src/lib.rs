//! `boteco-core`: domain building blocks shared by every crate.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    LocationId, MovementId, ProductId, PurchaseOrderId, ReplenishmentRequestId, SaleId,
    StockCountId, SupplierId,
};
pub use value_object::{Quantity, ValueObject};

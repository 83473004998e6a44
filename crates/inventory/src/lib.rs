//! Stock ledger domain module.
//!
//! Per-(location, product) stock cells and the immutable movements that are
//! the only way to change them. Pure domain logic: the infrastructure layer
//! persists movements and applies their deltas inside one unit of work.

pub mod movement;
pub mod stock;

pub use movement::{Movement, MovementDraft, MovementFilter, MovementKind, replay};
pub use stock::{StockCell, StockKey};

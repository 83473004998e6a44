//! Infrastructure layer: storage, the movement engine, configuration and the
//! `InventoryCore` facade that collaborators call.
//!
//! Every stock-changing operation runs inside one unit of work: the movements
//! it derives, their cell deltas and any header status change commit together
//! or not at all.

pub mod config;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod services;
pub mod store;

pub use config::CoreConfig;
pub use error::{CoreError, CoreResult, StoreError};
pub use outcome::{BatchOutcome, CountSheetEntry, CreatedRequest, ImportReport, TransitionOutcome};
pub use services::{InventoryCore, PurchaseLineInput};
pub use store::{InMemoryStore, InventoryStore, StoreReader, Tables, UnitOfWork};

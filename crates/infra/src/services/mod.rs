//! `InventoryCore`: the operations collaborators call.
//!
//! Each stock-changing operation opens one unit of work, runs the domain
//! decision, applies the resulting movements through the engine, stores the
//! touched records and commits. Any error drops the unit and nothing is kept.

mod catalog;
mod counting;
mod procurement;
mod replenishment;
mod sales;
mod stock;

use std::sync::RwLock;

use rust_decimal::Decimal;
use tracing::{info, instrument};

use boteco_core::{DomainError, LocationId};

use crate::config::CoreConfig;
use crate::error::{CoreResult, StoreError};
use crate::store::{InMemoryStore, InventoryStore, StoreReader, UnitOfWork};

pub use procurement::PurchaseLineInput;

pub struct InventoryCore<S = InMemoryStore> {
    store: S,
    central_hub: RwLock<Option<LocationId>>,
    safety_margin: Decimal,
}

impl InventoryCore<InMemoryStore> {
    pub fn in_memory(config: CoreConfig) -> Self {
        Self::new(InMemoryStore::new(), config)
    }
}

impl<S: InventoryStore> InventoryCore<S> {
    pub fn new(store: S, config: CoreConfig) -> Self {
        Self {
            store,
            central_hub: RwLock::new(config.central_hub),
            safety_margin: config.safety_margin,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn safety_margin(&self) -> Decimal {
        self.safety_margin
    }

    /// The designated hub, whether or not the location still exists.
    pub fn central_hub(&self) -> Option<LocationId> {
        match self.central_hub.read() {
            Ok(hub) => *hub,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Designate the location that sources transfers and receives purchases.
    ///
    /// The existence check and the designation happen under one unit of work,
    /// so they serialize with `delete_location`.
    #[instrument(skip(self))]
    pub fn designate_central_hub(&self, hub: LocationId) -> CoreResult<()> {
        let tx = self.store.begin()?;
        if tx.location(hub).is_none() {
            return Err(DomainError::not_found(format!("location {hub}")).into());
        }
        *self.central_hub.write().map_err(|_| StoreError::Poisoned)? = Some(hub);
        tx.commit()?;

        info!(%hub, "central hub designated");
        Ok(())
    }

    /// The hub as a precondition: designated and present in `reader`.
    fn resolve_central_hub<R: StoreReader>(&self, reader: &R) -> CoreResult<LocationId> {
        let hub = self
            .central_hub()
            .ok_or_else(|| DomainError::not_found("central hub (none designated)"))?;
        if reader.location(hub).is_none() {
            return Err(DomainError::not_found(format!("central hub location {hub}")).into());
        }
        Ok(hub)
    }
}

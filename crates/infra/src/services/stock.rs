//! Direct movements and ledger reads.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use boteco_core::{LocationId, MovementId, ProductId, Quantity};
use boteco_inventory::{Movement, MovementDraft, MovementFilter, MovementKind, StockCell};

use crate::engine;
use crate::error::CoreResult;
use crate::store::{InventoryStore, StoreReader, UnitOfWork};

use super::InventoryCore;

impl<S: InventoryStore> InventoryCore<S> {
    /// Record one movement and apply it to the ledger.
    #[instrument(skip(self))]
    pub fn apply_movement(
        &self,
        kind: MovementKind,
        product: ProductId,
        quantity: Decimal,
        source: Option<LocationId>,
        destination: Option<LocationId>,
    ) -> CoreResult<MovementId> {
        let draft = MovementDraft {
            kind,
            product,
            quantity: Quantity::positive(quantity)?,
            source,
            destination,
        };

        let mut tx = self.store.begin()?;
        let movement = engine::apply_movement(&mut tx, draft, Utc::now())?;
        tx.commit()?;

        info!(movement_id = %movement.id, ?kind, "movement applied");
        Ok(movement.id)
    }

    /// Every cell at `location`, sorted by product name.
    pub fn stock_at(&self, location: LocationId) -> CoreResult<Vec<StockCell>> {
        let reader = self.store.read()?;
        let mut cells: Vec<(String, StockCell)> = reader
            .stock_cells()
            .into_iter()
            .filter(|c| c.key.location == location)
            .map(|c| {
                let name = reader
                    .product(c.key.product)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                (name, c.clone())
            })
            .collect();
        cells.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(cells.into_iter().map(|(_, cell)| cell).collect())
    }

    /// Quantity of `product` at `location`, 0 when nothing has touched it.
    pub fn stock_level(&self, location: LocationId, product: ProductId) -> CoreResult<Decimal> {
        let reader = self.store.read()?;
        Ok(reader.stock_level(location, product))
    }

    /// The movement log, oldest first, narrowed by `filter`.
    pub fn movements(&self, filter: MovementFilter) -> CoreResult<Vec<Movement>> {
        let reader = self.store.read()?;
        Ok(reader
            .movements()
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }
}

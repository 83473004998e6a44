//! Physical counts: recording lines against the ledger and reconciling.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use boteco_core::{Aggregate, DomainError, LocationId, ProductId, StockCountId};
use boteco_counting::{
    CountLine, FinalizeCount, RecordCountLine, StartCount, StockCount, StockCountCommand,
    StockCountEvent,
};

use crate::engine;
use crate::error::CoreResult;
use crate::outcome::{BatchOutcome, CountSheetEntry, TransitionOutcome};
use crate::store::{InventoryStore, StoreReader, UnitOfWork};

use super::InventoryCore;

fn count_in<R: StoreReader>(reader: &R, id: StockCountId) -> CoreResult<StockCount> {
    reader
        .stock_count(id)
        .cloned()
        .ok_or_else(|| DomainError::not_found(format!("stock count {id}")).into())
}

fn location_of(count: &StockCount) -> CoreResult<LocationId> {
    count
        .location()
        .ok_or_else(|| DomainError::invariant("stock count has no location").into())
}

impl<S: InventoryStore> InventoryCore<S> {
    #[instrument(skip(self))]
    pub fn start_count(
        &self,
        location: LocationId,
        operator: String,
        notes: Option<String>,
    ) -> CoreResult<StockCountId> {
        let mut tx = self.store.begin()?;
        if tx.location(location).is_none() {
            return Err(DomainError::not_found(format!("location {location}")).into());
        }

        let id = StockCountId::new();
        let mut count = StockCount::empty(id);
        count.execute(&StockCountCommand::Start(StartCount {
            count_id: id,
            location,
            operator,
            notes,
            occurred_at: Utc::now(),
        }))?;
        tx.put_stock_count(count);
        tx.commit()?;

        info!(count_id = %id, %location, "stock count started");
        Ok(id)
    }

    /// Record (or replace) the physical quantity of an ingredient.
    ///
    /// The system quantity is the ledger value right now, 0 if the product was
    /// never stocked at the count's location.
    #[instrument(skip(self))]
    pub fn record_count_line(
        &self,
        count_id: StockCountId,
        product: ProductId,
        physical_quantity: Decimal,
    ) -> CoreResult<CountLine> {
        let mut tx = self.store.begin()?;
        let mut count = count_in(&tx, count_id)?;
        let location = location_of(&count)?;
        tx.product(product)
            .ok_or_else(|| DomainError::not_found(format!("product {product}")))?
            .ensure_ingredient("a count line")?;

        let system_quantity = tx.stock_level(location, product);
        count.execute(&StockCountCommand::RecordLine(RecordCountLine {
            count_id,
            product,
            system_quantity,
            physical_quantity,
            occurred_at: Utc::now(),
        }))?;
        let line = count
            .line_for(product)
            .cloned()
            .ok_or_else(|| DomainError::invariant("recorded count line is missing"))?;
        tx.put_stock_count(count);
        tx.commit()?;

        info!(%count_id, %product, difference = %line.difference(), "count line recorded");
        Ok(line)
    }

    /// Every ingredient with its current ledger quantity at the count's
    /// location and the physical quantity recorded so far, by product name.
    pub fn count_sheet(&self, count_id: StockCountId) -> CoreResult<Vec<CountSheetEntry>> {
        let reader = self.store.read()?;
        let count = count_in(&reader, count_id)?;
        let location = location_of(&count)?;

        let mut entries: Vec<CountSheetEntry> = reader
            .products()
            .into_iter()
            .filter(|p| p.is_ingredient())
            .map(|p| CountSheetEntry {
                product: p.id,
                product_name: p.name.clone(),
                unit_of_measure: p.unit_of_measure.clone(),
                system_quantity: reader.stock_level(location, p.id),
                physical_quantity: count.line_for(p.id).map(|l| l.physical_quantity),
            })
            .collect();
        entries.sort_by(|a, b| a.product_name.cmp(&b.product_name));
        Ok(entries)
    }

    /// Emit one adjustment per discrepancy and mark the count finalized.
    ///
    /// An already finalized count is reported as a no-op; its adjustments are
    /// never applied twice.
    #[instrument(skip(self))]
    pub fn finalize_count(&self, id: StockCountId) -> CoreResult<TransitionOutcome> {
        let mut tx = self.store.begin()?;
        let mut count = count_in(&tx, id)?;
        if count.is_finalized() {
            let reason = format!("stock count {id} is already finalized");
            warn!(count_id = %id, "{reason}");
            return Ok(TransitionOutcome::NoOp { reason });
        }

        let events = count.execute(&StockCountCommand::Finalize(FinalizeCount {
            count_id: id,
            occurred_at: Utc::now(),
        }))?;

        let mut movements = Vec::new();
        for event in &events {
            if let StockCountEvent::CountFinalized(finalized) = event {
                let applied = engine::apply_all(
                    &mut tx,
                    finalized.adjustment_drafts(),
                    finalized.occurred_at,
                )?;
                movements.extend(applied.into_iter().map(|m| m.id));
            }
        }
        tx.put_stock_count(count);
        tx.commit()?;

        info!(count_id = %id, adjustments = movements.len(), "stock count finalized");
        Ok(TransitionOutcome::Applied { movements })
    }

    /// Finalize several counts, each in its own unit of work.
    #[instrument(skip(self))]
    pub fn finalize_counts(&self, ids: &[StockCountId]) -> BatchOutcome<StockCountId> {
        let mut outcome = BatchOutcome::default();
        for &id in ids {
            match self.finalize_count(id) {
                Ok(TransitionOutcome::Applied { .. }) => outcome.processed.push(id),
                Ok(TransitionOutcome::NoOp { reason }) => outcome.skipped.push((id, reason)),
                Err(err) => {
                    warn!(count_id = %id, error = %err, "stock count finalization failed");
                    outcome.failed.push((id, err));
                }
            }
        }
        outcome
    }

    pub fn stock_count(&self, id: StockCountId) -> CoreResult<StockCount> {
        let reader = self.store.read()?;
        count_in(&reader, id)
    }
}

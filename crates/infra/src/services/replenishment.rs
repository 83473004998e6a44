//! Replenishment: suggestions, requests and their completion from the hub.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use boteco_core::{Aggregate, DomainError, LocationId, ReplenishmentRequestId};
use boteco_events::Event;
use boteco_replenishment::{
    CancelRequest, CompleteRequest, CreateRequest, ReplenishmentCommand, ReplenishmentEvent,
    ReplenishmentLine, ReplenishmentRequest, ReplenishmentStatus, ReplenishmentSuggestion,
    suggest,
};

use crate::engine;
use crate::error::CoreResult;
use crate::outcome::{CreatedRequest, TransitionOutcome};
use crate::store::{InventoryStore, StoreReader, UnitOfWork};

use super::InventoryCore;

fn request_in<R: StoreReader>(
    reader: &R,
    id: ReplenishmentRequestId,
) -> CoreResult<ReplenishmentRequest> {
    reader
        .replenishment_request(id)
        .cloned()
        .ok_or_else(|| DomainError::not_found(format!("replenishment request {id}")).into())
}

fn not_pending(request: &ReplenishmentRequest, action: &str) -> TransitionOutcome {
    let reason = format!(
        "replenishment request {} is {:?}, nothing to {action}",
        request.id_typed(),
        request.status()
    );
    warn!(request_id = %request.id_typed(), status = ?request.status(), "{reason}");
    TransitionOutcome::NoOp { reason }
}

impl<S: InventoryStore> InventoryCore<S> {
    /// Advisory: ingredient cells at `location` at or below their threshold.
    pub fn suggest_replenishment(
        &self,
        location: LocationId,
    ) -> CoreResult<Vec<ReplenishmentSuggestion>> {
        let reader = self.store.read()?;
        if reader.location(location).is_none() {
            return Err(DomainError::not_found(format!("location {location}")).into());
        }

        let cells = reader.stock_cells();
        let pairs = cells
            .iter()
            .filter(|c| c.key.location == location)
            .filter_map(|c| reader.product(c.key.product).map(|p| (*c, p)));
        Ok(suggest(pairs, self.safety_margin))
    }

    /// Persist a Pending request from the lines a manager accepted.
    ///
    /// Zero lines are dropped silently; negative lines and lines that are not
    /// for a known ingredient are skipped with a reason. Nothing is stored
    /// when no line survives, or when the destination is the designated hub.
    #[instrument(skip(self))]
    pub fn create_replenishment_request(
        &self,
        destination: LocationId,
        lines: Vec<ReplenishmentLine>,
    ) -> CoreResult<CreatedRequest> {
        let mut tx = self.store.begin()?;
        if tx.location(destination).is_none() {
            return Err(DomainError::not_found(format!("location {destination}")).into());
        }
        if self.central_hub() == Some(destination) {
            return Err(DomainError::invariant(format!(
                "location {destination} is the central hub and cannot be replenished from itself"
            ))
            .into());
        }

        let mut accepted = Vec::with_capacity(lines.len());
        let mut skipped = Vec::new();
        for line in lines {
            if line.quantity.is_zero() {
                continue;
            }
            if line.quantity < Decimal::ZERO {
                skipped.push((line.product, format!("negative quantity {}", line.quantity)));
                continue;
            }
            let Some(product) = tx.product(line.product) else {
                skipped.push((line.product, format!("unknown product {}", line.product)));
                continue;
            };
            if let Err(err) = product.ensure_ingredient("a replenishment line") {
                skipped.push((line.product, err.to_string()));
                continue;
            }
            accepted.push(line);
        }
        for (product, reason) in &skipped {
            warn!(%product, %reason, "replenishment line skipped");
        }

        let id = ReplenishmentRequestId::new();
        let mut request = ReplenishmentRequest::empty(id);
        request.execute(&ReplenishmentCommand::Create(CreateRequest {
            request_id: id,
            destination,
            lines: accepted,
            occurred_at: Utc::now(),
        }))?;
        let line_count = request.lines().len();
        tx.put_replenishment_request(request);
        tx.commit()?;

        info!(request_id = %id, %destination, lines = line_count, "replenishment request created");
        Ok(CreatedRequest { id, skipped })
    }

    /// Transfer every line from the central hub and mark the request Completed.
    ///
    /// A request that is no longer Pending is left alone and reported as a
    /// no-op. A missing hub fails before any movement is written.
    #[instrument(skip(self))]
    pub fn complete_replenishment_request(
        &self,
        id: ReplenishmentRequestId,
    ) -> CoreResult<TransitionOutcome> {
        let mut tx = self.store.begin()?;
        let mut request = request_in(&tx, id)?;
        if request.status() != ReplenishmentStatus::Pending {
            return Ok(not_pending(&request, "complete"));
        }
        let hub = self.resolve_central_hub(&tx)?;

        let events = request.execute(&ReplenishmentCommand::Complete(CompleteRequest {
            request_id: id,
            central_hub: hub,
            occurred_at: Utc::now(),
        }))?;

        let mut movements = Vec::new();
        for event in &events {
            if let ReplenishmentEvent::RequestCompleted(completed) = event {
                let applied = engine::apply_all(
                    &mut tx,
                    completed.transfer_drafts()?,
                    completed.occurred_at,
                )?;
                movements.extend(applied.into_iter().map(|m| m.id));
            }
            info!(request_id = %id, event = event.event_type(), "replenishment request transition");
        }
        tx.put_replenishment_request(request);
        tx.commit()?;

        Ok(TransitionOutcome::Applied { movements })
    }

    #[instrument(skip(self))]
    pub fn cancel_replenishment_request(
        &self,
        id: ReplenishmentRequestId,
    ) -> CoreResult<TransitionOutcome> {
        let mut tx = self.store.begin()?;
        let mut request = request_in(&tx, id)?;
        if request.status() != ReplenishmentStatus::Pending {
            return Ok(not_pending(&request, "cancel"));
        }

        request.execute(&ReplenishmentCommand::Cancel(CancelRequest {
            request_id: id,
            occurred_at: Utc::now(),
        }))?;
        tx.put_replenishment_request(request);
        tx.commit()?;

        info!(request_id = %id, "replenishment request cancelled");
        Ok(TransitionOutcome::Applied { movements: Vec::new() })
    }

    pub fn replenishment_request(
        &self,
        id: ReplenishmentRequestId,
    ) -> CoreResult<ReplenishmentRequest> {
        let reader = self.store.read()?;
        request_in(&reader, id)
    }
}

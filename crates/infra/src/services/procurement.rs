//! Procurement: purchase orders and their receipt at the central hub.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use boteco_core::{Aggregate, DomainError, LocationId, ProductId, PurchaseOrderId, SupplierId};
use boteco_purchasing::{
    AddLine, CancelPurchaseOrder, CreatePurchaseOrder, PurchaseOrder, PurchaseOrderCommand,
    PurchaseOrderEvent, ReceiveGoods,
};

use crate::engine;
use crate::error::CoreResult;
use crate::outcome::{BatchOutcome, TransitionOutcome};
use crate::store::{InventoryStore, StoreReader, UnitOfWork};

use super::InventoryCore;

/// One line of a new purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLineInput {
    pub product: ProductId,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
}

impl PurchaseLineInput {
    pub fn new(product: ProductId, quantity: Decimal) -> Self {
        Self {
            product,
            quantity,
            unit_cost: None,
        }
    }

    pub fn at_cost(mut self, unit_cost: Decimal) -> Self {
        self.unit_cost = Some(unit_cost);
        self
    }
}

fn order_in<R: StoreReader>(reader: &R, id: PurchaseOrderId) -> CoreResult<PurchaseOrder> {
    reader
        .purchase_order(id)
        .cloned()
        .ok_or_else(|| DomainError::not_found(format!("purchase order {id}")).into())
}

fn not_pending(order: &PurchaseOrder, action: &str) -> TransitionOutcome {
    let reason = format!(
        "purchase order {} is {:?}, nothing to {action}",
        order.id_typed(),
        order.status()
    );
    warn!(order_id = %order.id_typed(), status = ?order.status(), "{reason}");
    TransitionOutcome::NoOp { reason }
}

impl<S: InventoryStore> InventoryCore<S> {
    #[instrument(skip(self))]
    pub fn create_purchase_order(
        &self,
        supplier: SupplierId,
        invoice_number: Option<String>,
        lines: Vec<PurchaseLineInput>,
    ) -> CoreResult<PurchaseOrderId> {
        let mut tx = self.store.begin()?;
        if tx.supplier(supplier).is_none() {
            return Err(DomainError::not_found(format!("supplier {supplier}")).into());
        }

        let id = PurchaseOrderId::new();
        let now = Utc::now();
        let mut order = PurchaseOrder::empty(id);
        order.execute(&PurchaseOrderCommand::CreatePurchaseOrder(CreatePurchaseOrder {
            order_id: id,
            supplier,
            invoice_number,
            occurred_at: now,
        }))?;

        for line in lines {
            if tx.product(line.product).is_none() {
                return Err(DomainError::not_found(format!("product {}", line.product)).into());
            }
            order.execute(&PurchaseOrderCommand::AddLine(AddLine {
                order_id: id,
                product: line.product,
                quantity: line.quantity,
                unit_cost: line.unit_cost,
                occurred_at: now,
            }))?;
        }

        let line_count = order.lines().len();
        tx.put_purchase_order(order);
        tx.commit()?;

        info!(order_id = %id, %supplier, lines = line_count, "purchase order created");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub fn cancel_purchase_order(&self, id: PurchaseOrderId) -> CoreResult<TransitionOutcome> {
        let mut tx = self.store.begin()?;
        let mut order = order_in(&tx, id)?;
        if !order.is_pending() {
            return Ok(not_pending(&order, "cancel"));
        }

        order.execute(&PurchaseOrderCommand::Cancel(CancelPurchaseOrder {
            order_id: id,
            occurred_at: Utc::now(),
        }))?;
        tx.put_purchase_order(order);
        tx.commit()?;

        info!(order_id = %id, "purchase order cancelled");
        Ok(TransitionOutcome::Applied { movements: Vec::new() })
    }

    /// Receive every Pending order in `ids` at the central hub.
    ///
    /// A missing hub rejects the whole batch up front. Otherwise each order is
    /// its own unit of work: Received/Cancelled orders are skipped and an order
    /// that fails is rolled back without touching its siblings.
    #[instrument(skip(self))]
    pub fn receive_purchase_orders(
        &self,
        ids: &[PurchaseOrderId],
    ) -> CoreResult<BatchOutcome<PurchaseOrderId>> {
        let hub = {
            let reader = self.store.read()?;
            self.resolve_central_hub(&reader)?
        };

        let mut outcome = BatchOutcome::default();
        for &id in ids {
            match self.receive_one(id, hub) {
                Ok(TransitionOutcome::Applied { .. }) => outcome.processed.push(id),
                Ok(TransitionOutcome::NoOp { reason }) => outcome.skipped.push((id, reason)),
                Err(err) => {
                    warn!(order_id = %id, error = %err, "purchase order receipt failed");
                    outcome.failed.push((id, err));
                }
            }
        }

        info!(
            processed = outcome.processed_count(),
            skipped = outcome.skipped_count(),
            failed = outcome.failed_count(),
            "purchase orders received"
        );
        Ok(outcome)
    }

    fn receive_one(&self, id: PurchaseOrderId, hub: LocationId) -> CoreResult<TransitionOutcome> {
        let mut tx = self.store.begin()?;
        let mut order = order_in(&tx, id)?;
        if !order.is_pending() {
            return Ok(not_pending(&order, "receive"));
        }

        let events = order.execute(&PurchaseOrderCommand::ReceiveGoods(ReceiveGoods {
            order_id: id,
            central_hub: hub,
            occurred_at: Utc::now(),
        }))?;

        let mut movements = Vec::new();
        for event in &events {
            if let PurchaseOrderEvent::GoodsReceived(received) = event {
                let applied =
                    engine::apply_all(&mut tx, received.entry_drafts(), received.occurred_at)?;
                movements.extend(applied.into_iter().map(|m| m.id));
            }
        }
        tx.put_purchase_order(order);
        tx.commit()?;

        info!(order_id = %id, movements = movements.len(), "purchase order received");
        Ok(TransitionOutcome::Applied { movements })
    }

    pub fn purchase_order(&self, id: PurchaseOrderId) -> CoreResult<PurchaseOrder> {
        let reader = self.store.read()?;
        order_in(&reader, id)
    }
}

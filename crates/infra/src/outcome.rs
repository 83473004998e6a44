//! Structured results for batch and workflow operations.

use rust_decimal::Decimal;
use serde::Serialize;

use boteco_core::{MovementId, ProductId, ReplenishmentRequestId, SaleId};

use crate::error::CoreError;

/// Per-item result of a batch: each item is its own unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome<Id> {
    pub processed: Vec<Id>,
    /// Items left as they were (already terminal), with the reason.
    pub skipped: Vec<(Id, String)>,
    /// Items whose unit of work was rolled back.
    pub failed: Vec<(Id, CoreError)>,
}

impl<Id> Default for BatchOutcome<Id> {
    fn default() -> Self {
        Self {
            processed: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<Id> BatchOutcome<Id> {
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// Result of a single header transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied { movements: Vec<MovementId> },
    /// The header was not in a state that allows the transition; nothing changed.
    NoOp { reason: String },
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied { .. })
    }

    pub fn movements(&self) -> &[MovementId] {
        match self {
            TransitionOutcome::Applied { movements } => movements,
            TransitionOutcome::NoOp { .. } => &[],
        }
    }
}

/// A replenishment request that was persisted, plus the lines left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRequest {
    pub id: ReplenishmentRequestId,
    pub skipped: Vec<(ProductId, String)>,
}

/// Result of importing a sales report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub recorded: Vec<SaleId>,
    /// Names of products created because no product had that name.
    pub created_products: Vec<String>,
    /// Zero-based row index and the reason the row was skipped.
    pub skipped: Vec<(usize, String)>,
}

/// One row of a count sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountSheetEntry {
    pub product: ProductId,
    pub product_name: String,
    pub unit_of_measure: String,
    pub system_quantity: Decimal,
    pub physical_quantity: Option<Decimal>,
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use boteco_core::{DomainError, DomainResult, LocationId, ProductId};

/// Address of a stock cell: one product at one location.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockKey {
    pub location: LocationId,
    pub product: ProductId,
}

impl StockKey {
    pub fn new(location: LocationId, product: ProductId) -> Self {
        Self { location, product }
    }
}

/// How much of a product is at a location, plus its reorder threshold.
///
/// Cells are created lazily (quantity 0, minimum 0) the first time something
/// touches the pair and are never deleted. `quantity` may go negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockCell {
    pub key: StockKey,
    quantity: Decimal,
    minimum_quantity: Decimal,
}

impl StockCell {
    pub fn empty(key: StockKey) -> Self {
        Self {
            key,
            quantity: Decimal::ZERO,
            minimum_quantity: Decimal::ZERO,
        }
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn minimum_quantity(&self) -> Decimal {
        self.minimum_quantity
    }

    /// At or below the reorder threshold.
    pub fn needs_replenishment(&self) -> bool {
        self.quantity <= self.minimum_quantity
    }

    /// Relative update. The storage layer calls this; nothing else may.
    ///
    /// A result outside the `Decimal` range is rejected and the cell is left
    /// unchanged.
    pub fn add(&mut self, delta: Decimal) -> DomainResult<Decimal> {
        self.quantity = self.quantity.checked_add(delta).ok_or_else(|| {
            DomainError::validation(format!(
                "stock of {} at {} would overflow ({} + {delta})",
                self.key.product, self.key.location, self.quantity
            ))
        })?;
        Ok(self.quantity)
    }

    pub fn set_minimum_quantity(&mut self, minimum: Decimal) {
        self.minimum_quantity = minimum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn new_cell_starts_at_zero_and_needs_replenishment() {
        let cell = StockCell::empty(StockKey::new(LocationId::new(), ProductId::new()));
        assert_eq!(cell.quantity(), Decimal::ZERO);
        assert_eq!(cell.minimum_quantity(), Decimal::ZERO);
        assert!(cell.needs_replenishment());
    }

    #[test]
    fn deltas_accumulate_and_may_go_negative() {
        let mut cell = StockCell::empty(StockKey::new(LocationId::new(), ProductId::new()));
        cell.add(dec!(3)).unwrap();
        cell.add(dec!(-5.5)).unwrap();
        assert_eq!(cell.quantity(), dec!(-2.5));
    }

    #[test]
    fn overflowing_delta_is_rejected_and_leaves_the_cell_alone() {
        let mut cell = StockCell::empty(StockKey::new(LocationId::new(), ProductId::new()));
        cell.add(Decimal::MAX).unwrap();

        let err = cell.add(dec!(1)).unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(cell.quantity(), Decimal::MAX);
    }
}

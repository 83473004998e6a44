use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use boteco_catalog::{Product, RecipeLine};
use boteco_core::{DomainResult, LocationId, ProductId, Quantity, SaleId};
use boteco_inventory::MovementDraft;

use crate::explosion::explode;

/// A day's aggregated sales of one product at one location.
///
/// The consumption decided at recording time is kept with the sale so that
/// deleting it restores exactly what was taken, even if the recipe changed
/// in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub location: LocationId,
    pub product: ProductId,
    pub date: NaiveDate,
    pub quantity: Quantity,
    consumption: Vec<MovementDraft>,
}

impl Sale {
    pub fn record(
        id: SaleId,
        location: LocationId,
        product: &Product,
        recipe: &[RecipeLine],
        quantity: Decimal,
        date: NaiveDate,
    ) -> DomainResult<Self> {
        let quantity = Quantity::positive(quantity)?;
        let consumption = explode(product, recipe, location, quantity)?;
        Ok(Self {
            id,
            location,
            product: product.id,
            date,
            quantity,
            consumption,
        })
    }

    /// Exit movements this sale caused.
    pub fn consumption(&self) -> &[MovementDraft] {
        &self.consumption
    }

    /// Entry movements that undo [`Sale::consumption`].
    pub fn reversal(&self) -> Vec<MovementDraft> {
        self.consumption.iter().map(MovementDraft::mirrored).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boteco_catalog::NewProduct;
    use boteco_core::DomainError;
    use boteco_inventory::MovementKind;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_quantity_sale_is_rejected() {
        let beer = NewProduct::ingredient("Chopp").into_product(ProductId::new()).unwrap();
        let err = Sale::record(
            SaleId::new(),
            LocationId::new(),
            &beer,
            &[],
            Decimal::ZERO,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn reversal_mirrors_consumption() {
        let beer = NewProduct::ingredient("Chopp").into_product(ProductId::new()).unwrap();
        let bar = LocationId::new();
        let sale = Sale::record(
            SaleId::new(),
            bar,
            &beer,
            &[],
            dec!(4),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        )
        .unwrap();

        let reversal = sale.reversal();
        assert_eq!(reversal.len(), 1);
        assert_eq!(reversal[0].kind, MovementKind::Entry);
        assert_eq!(reversal[0].destination, Some(bar));
        assert_eq!(reversal[0].quantity, sale.consumption()[0].quantity);
    }
}

//! Sales and their consumption, including the sales-report import.

use chrono::{Local, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use boteco_catalog::{NewProduct, Product};
use boteco_core::{DomainError, LocationId, MovementId, ProductId, SaleId};
use boteco_sales::{NormalizedSale, Sale, SalesReportRow, normalize_row};

use crate::engine;
use crate::error::CoreResult;
use crate::outcome::ImportReport;
use crate::store::{InventoryStore, StoreReader, UnitOfWork};

use super::InventoryCore;

/// Explode and apply a new sale inside `tx`.
fn record_sale_in<U: UnitOfWork>(
    tx: &mut U,
    id: SaleId,
    location: LocationId,
    product: &Product,
    quantity: Decimal,
    date: NaiveDate,
) -> CoreResult<Sale> {
    if tx.location(location).is_none() {
        return Err(DomainError::not_found(format!("location {location}")).into());
    }
    let recipe = tx.recipe(product.id).to_vec();
    let sale = Sale::record(id, location, product, &recipe, quantity, date)?;
    engine::apply_all(tx, sale.consumption().to_vec(), Utc::now())?;
    tx.put_sale(sale.clone());
    Ok(sale)
}

fn product_in<U: UnitOfWork>(tx: &U, id: ProductId) -> CoreResult<Product> {
    tx.product(id)
        .cloned()
        .ok_or_else(|| DomainError::not_found(format!("product {id}")).into())
}

impl<S: InventoryStore> InventoryCore<S> {
    /// Record a day's sales of a product and consume its ingredients.
    #[instrument(skip(self))]
    pub fn record_sale(
        &self,
        location: LocationId,
        product: ProductId,
        quantity: Decimal,
        date: NaiveDate,
    ) -> CoreResult<SaleId> {
        let mut tx = self.store.begin()?;
        let product = product_in(&tx, product)?;
        let sale = record_sale_in(&mut tx, SaleId::new(), location, &product, quantity, date)?;
        tx.commit()?;

        info!(sale_id = %sale.id, movements = sale.consumption().len(), "sale recorded");
        Ok(sale.id)
    }

    /// Delete a sale and give back exactly what it consumed.
    #[instrument(skip(self))]
    pub fn delete_sale(&self, id: SaleId) -> CoreResult<Vec<MovementId>> {
        let mut tx = self.store.begin()?;
        let sale = tx
            .sale(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("sale {id}")))?;
        let reversed = engine::apply_all(&mut tx, sale.reversal(), Utc::now())?;
        tx.remove_sale(id)?;
        tx.commit()?;

        info!(sale_id = %id, movements = reversed.len(), "sale deleted and consumption reversed");
        Ok(reversed.into_iter().map(|m| m.id).collect())
    }

    /// Change a sale's quantity: reverse the old consumption, then explode the
    /// new quantity with the current recipe.
    #[instrument(skip(self))]
    pub fn update_sale_quantity(&self, id: SaleId, quantity: Decimal) -> CoreResult<()> {
        let mut tx = self.store.begin()?;
        let old = tx
            .sale(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("sale {id}")))?;
        let product = product_in(&tx, old.product)?;

        engine::apply_all(&mut tx, old.reversal(), Utc::now())?;
        let updated = record_sale_in(&mut tx, old.id, old.location, &product, quantity, old.date)?;
        tx.commit()?;

        info!(sale_id = %id, old = %old.quantity, new = %updated.quantity, "sale quantity updated");
        Ok(())
    }

    pub fn sale(&self, id: SaleId) -> CoreResult<Sale> {
        let reader = self.store.read()?;
        reader
            .sale(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("sale {id}")).into())
    }

    /// Import rows of the point-of-sale report as today's sales at `location`.
    ///
    /// Every row is its own unit of work. Malformed rows and rows that fail to
    /// record are reported in `skipped`; unknown product names are created as
    /// ingredients.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn import_sales(
        &self,
        location: LocationId,
        rows: &[SalesReportRow],
    ) -> CoreResult<ImportReport> {
        {
            let reader = self.store.read()?;
            if reader.location(location).is_none() {
                return Err(DomainError::not_found(format!("location {location}")).into());
            }
        }

        let today = Local::now().date_naive();
        let mut report = ImportReport::default();

        for (index, row) in rows.iter().enumerate() {
            let normalized = match normalize_row(row) {
                Ok(normalized) => normalized,
                Err(reason) => {
                    warn!(row = index, %reason, "sales report row skipped");
                    report.skipped.push((index, reason.to_string()));
                    continue;
                }
            };

            match self.import_row(location, &normalized, today) {
                Ok((sale_id, created)) => {
                    report.recorded.push(sale_id);
                    if created {
                        report.created_products.push(normalized.product_name);
                    }
                }
                Err(err) => {
                    warn!(row = index, error = %err, "sales report row not recorded");
                    report.skipped.push((index, err.to_string()));
                }
            }
        }

        info!(
            recorded = report.recorded.len(),
            created = report.created_products.len(),
            skipped = report.skipped.len(),
            "sales report imported"
        );
        Ok(report)
    }

    fn import_row(
        &self,
        location: LocationId,
        row: &NormalizedSale,
        date: NaiveDate,
    ) -> CoreResult<(SaleId, bool)> {
        let mut tx = self.store.begin()?;

        let existing = tx.product_by_name(&row.product_name).cloned();
        let (product, created) = match existing {
            Some(existing) => (existing, false),
            None => {
                let product = NewProduct::ingredient(row.product_name.clone())
                    .into_product(ProductId::new())?;
                tx.put_product(product.clone());
                (product, true)
            }
        };

        let sale = record_sale_in(
            &mut tx,
            SaleId::new(),
            location,
            &product,
            row.quantity.value(),
            date,
        )?;
        tx.commit()?;

        if created {
            info!(product_id = %product.id, name = %product.name, "product created from sales report");
        }
        Ok((sale.id, created))
    }
}

//! Reference data: locations, products, suppliers, recipes and thresholds.

use rust_decimal::Decimal;
use tracing::{info, instrument};

use boteco_catalog::{
    Location, NewLocation, NewProduct, NewSupplier, Product, RecipeComponent, RecipeLine,
    Supplier, build_recipe, normalize_name,
};
use boteco_core::{DomainError, LocationId, ProductId, SupplierId};
use boteco_inventory::StockKey;

use crate::error::CoreResult;
use crate::store::{InventoryStore, StoreReader, UnitOfWork};

use super::InventoryCore;

/// First record that still points at `location`, if any.
fn location_reference<R: StoreReader>(reader: &R, location: LocationId) -> Option<&'static str> {
    if reader.stock_cells().iter().any(|c| c.key.location == location) {
        return Some("stock cells");
    }
    if reader.movements().iter().any(|m| m.touches(location)) {
        return Some("movements");
    }
    if reader.sales().iter().any(|s| s.location == location) {
        return Some("sales");
    }
    if reader
        .replenishment_requests()
        .iter()
        .any(|r| r.destination() == Some(location))
    {
        return Some("replenishment requests");
    }
    if reader.stock_counts().iter().any(|c| c.location() == Some(location)) {
        return Some("stock counts");
    }
    None
}

/// First record that still points at `product`, if any. Its own recipe does
/// not count; it goes with the product.
fn product_reference<R: StoreReader>(reader: &R, product: ProductId) -> Option<&'static str> {
    if reader.stock_cells().iter().any(|c| c.key.product == product) {
        return Some("stock cells");
    }
    if reader.movements().iter().any(|m| m.product == product) {
        return Some("movements");
    }
    if reader.sales().iter().any(|s| s.product == product) {
        return Some("sales");
    }
    if !reader.recipes_using(product).is_empty() {
        return Some("recipes");
    }
    if reader
        .replenishment_requests()
        .iter()
        .any(|r| r.lines().iter().any(|l| l.product == product))
    {
        return Some("replenishment requests");
    }
    if reader
        .purchase_orders()
        .iter()
        .any(|o| o.lines().iter().any(|l| l.product == product))
    {
        return Some("purchase orders");
    }
    if reader
        .stock_counts()
        .iter()
        .any(|c| c.line_for(product).is_some())
    {
        return Some("stock counts");
    }
    None
}

impl<S: InventoryStore> InventoryCore<S> {
    #[instrument(skip(self))]
    pub fn register_location(&self, input: NewLocation) -> CoreResult<Location> {
        let location = input.into_location(LocationId::new())?;

        let mut tx = self.store.begin()?;
        if tx.location_by_name(&location.name).is_some() {
            return Err(DomainError::conflict(format!(
                "a location named '{}' already exists",
                location.name
            ))
            .into());
        }
        tx.put_location(location.clone());
        tx.commit()?;

        info!(location_id = %location.id, name = %location.name, "location registered");
        Ok(location)
    }

    #[instrument(skip(self))]
    pub fn register_product(&self, input: NewProduct) -> CoreResult<Product> {
        let product = input.into_product(ProductId::new())?;

        let mut tx = self.store.begin()?;
        if tx.product_by_name(&product.name).is_some() {
            return Err(DomainError::conflict(format!(
                "a product named '{}' already exists",
                product.name
            ))
            .into());
        }
        tx.put_product(product.clone());
        tx.commit()?;

        info!(product_id = %product.id, name = %product.name, kind = ?product.kind, "product registered");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub fn register_supplier(&self, input: NewSupplier) -> CoreResult<Supplier> {
        let supplier = input.into_supplier(SupplierId::new())?;

        let mut tx = self.store.begin()?;
        if tx.supplier_by_name(&supplier.name).is_some() {
            return Err(DomainError::conflict(format!(
                "a supplier named '{}' already exists",
                supplier.name
            ))
            .into());
        }
        tx.put_supplier(supplier.clone());
        tx.commit()?;

        info!(supplier_id = %supplier.id, name = %supplier.name, "supplier registered");
        Ok(supplier)
    }

    pub fn location(&self, id: LocationId) -> CoreResult<Location> {
        let reader = self.store.read()?;
        reader
            .location(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("location {id}")).into())
    }

    pub fn product(&self, id: ProductId) -> CoreResult<Product> {
        let reader = self.store.read()?;
        reader
            .product(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("product {id}")).into())
    }

    pub fn product_by_name(&self, name: &str) -> CoreResult<Option<Product>> {
        let reader = self.store.read()?;
        Ok(reader.product_by_name(&normalize_name(name)).cloned())
    }

    pub fn supplier(&self, id: SupplierId) -> CoreResult<Supplier> {
        let reader = self.store.read()?;
        reader
            .supplier(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("supplier {id}")).into())
    }

    /// Find a location by id (UUID text) or by exact name.
    pub fn resolve_location(&self, id_or_name: &str) -> CoreResult<Location> {
        let reader = self.store.read()?;
        let wanted = id_or_name.trim();
        let by_id = wanted
            .parse::<LocationId>()
            .ok()
            .and_then(|id| reader.location(id));
        by_id
            .or_else(|| reader.location_by_name(&normalize_name(wanted)))
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("location '{wanted}'")).into())
    }

    /// Replace the recipe of a composite product. An empty list clears it.
    #[instrument(skip(self))]
    pub fn set_recipe(
        &self,
        composite: ProductId,
        components: Vec<(ProductId, Decimal)>,
    ) -> CoreResult<Vec<RecipeLine>> {
        let mut tx = self.store.begin()?;
        let owner = tx
            .product(composite)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("product {composite}")))?;

        let components = components
            .into_iter()
            .map(|(ingredient, quantity_per_unit)| {
                let ingredient = tx
                    .product(ingredient)
                    .cloned()
                    .ok_or_else(|| DomainError::not_found(format!("product {ingredient}")))?;
                Ok(RecipeComponent {
                    ingredient,
                    quantity_per_unit,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        let lines = build_recipe(&owner, &components)?;
        tx.replace_recipe(composite, lines.clone());
        tx.commit()?;

        info!(product_id = %composite, lines = lines.len(), "recipe replaced");
        Ok(lines)
    }

    pub fn recipe(&self, composite: ProductId) -> CoreResult<Vec<RecipeLine>> {
        let reader = self.store.read()?;
        Ok(reader.recipe(composite).to_vec())
    }

    /// Change only the reorder threshold of a cell, creating it if needed.
    #[instrument(skip(self))]
    pub fn set_minimum_quantity(
        &self,
        location: LocationId,
        product: ProductId,
        minimum: Decimal,
    ) -> CoreResult<()> {
        if minimum < Decimal::ZERO {
            return Err(DomainError::validation("minimum quantity cannot be negative").into());
        }

        let mut tx = self.store.begin()?;
        if tx.location(location).is_none() {
            return Err(DomainError::not_found(format!("location {location}")).into());
        }
        tx.product(product)
            .ok_or_else(|| DomainError::not_found(format!("product {product}")))?
            .ensure_ingredient("a stock threshold")?;

        tx.set_minimum_quantity(StockKey::new(location, product), minimum);
        tx.commit()?;

        info!(%location, %product, %minimum, "minimum quantity set");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn delete_location(&self, id: LocationId) -> CoreResult<()> {
        let mut tx = self.store.begin()?;
        if tx.location(id).is_none() {
            return Err(DomainError::not_found(format!("location {id}")).into());
        }
        if self.central_hub() == Some(id) {
            return Err(DomainError::conflict(format!(
                "location {id} is the designated central hub"
            ))
            .into());
        }
        if let Some(what) = location_reference(&tx, id) {
            return Err(DomainError::conflict(format!(
                "location {id} is still referenced by {what}"
            ))
            .into());
        }
        tx.remove_location(id)?;
        tx.commit()?;

        info!(location_id = %id, "location deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn delete_product(&self, id: ProductId) -> CoreResult<()> {
        let mut tx = self.store.begin()?;
        if tx.product(id).is_none() {
            return Err(DomainError::not_found(format!("product {id}")).into());
        }
        if let Some(what) = product_reference(&tx, id) {
            return Err(DomainError::conflict(format!(
                "product {id} is still referenced by {what}"
            ))
            .into());
        }
        tx.remove_product(id)?;
        tx.commit()?;

        info!(product_id = %id, "product deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn delete_supplier(&self, id: SupplierId) -> CoreResult<()> {
        let mut tx = self.store.begin()?;
        if tx.supplier(id).is_none() {
            return Err(DomainError::not_found(format!("supplier {id}")).into());
        }
        if tx.purchase_orders().iter().any(|o| o.supplier() == Some(id)) {
            return Err(DomainError::conflict(format!(
                "supplier {id} is still referenced by purchase orders"
            ))
            .into());
        }
        tx.remove_supplier(id)?;
        tx.commit()?;

        info!(supplier_id = %id, "supplier deleted");
        Ok(())
    }
}

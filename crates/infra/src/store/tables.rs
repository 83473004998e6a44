use std::collections::HashMap;
use std::ops::Deref;

use rust_decimal::Decimal;

use boteco_catalog::{Location, Product, RecipeLine, Supplier};
use boteco_core::{
    DomainResult, Entity, LocationId, ProductId, PurchaseOrderId, ReplenishmentRequestId, SaleId,
    StockCountId, SupplierId,
};
use boteco_counting::StockCount;
use boteco_inventory::{Movement, StockCell, StockKey};
use boteco_purchasing::PurchaseOrder;
use boteco_replenishment::ReplenishmentRequest;
use boteco_sales::Sale;

use crate::error::StoreError;

use super::r#trait::StoreReader;

/// Every record the core keeps, keyed by identity.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    locations: HashMap<LocationId, Location>,
    products: HashMap<ProductId, Product>,
    suppliers: HashMap<SupplierId, Supplier>,
    recipes: HashMap<ProductId, Vec<RecipeLine>>,
    stock: HashMap<StockKey, StockCell>,
    movements: Vec<Movement>,
    sales: HashMap<SaleId, Sale>,
    replenishment_requests: HashMap<ReplenishmentRequestId, ReplenishmentRequest>,
    purchase_orders: HashMap<PurchaseOrderId, PurchaseOrder>,
    stock_counts: HashMap<StockCountId, StockCount>,
}

fn missing(what: &str, id: impl std::fmt::Display) -> StoreError {
    StoreError::Missing(format!("{what} {id}"))
}

/// Insert or replace reference data under its own id.
fn upsert<E: Entity>(table: &mut HashMap<E::Id, E>, entity: E) {
    table.insert(entity.id().clone(), entity);
}

impl Tables {
    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(&id)
    }

    pub fn location_by_name(&self, name: &str) -> Option<&Location> {
        self.locations.values().find(|l| l.name == name)
    }

    pub fn locations(&self) -> Vec<&Location> {
        self.locations.values().collect()
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    pub fn product_by_name(&self, name: &str) -> Option<&Product> {
        self.products.values().find(|p| p.name == name)
    }

    pub fn products(&self) -> Vec<&Product> {
        self.products.values().collect()
    }

    pub fn supplier(&self, id: SupplierId) -> Option<&Supplier> {
        self.suppliers.get(&id)
    }

    pub fn supplier_by_name(&self, name: &str) -> Option<&Supplier> {
        self.suppliers.values().find(|s| s.name == name)
    }

    pub fn recipe(&self, composite: ProductId) -> &[RecipeLine] {
        self.recipes.get(&composite).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn recipes_using(&self, ingredient: ProductId) -> Vec<&RecipeLine> {
        self.recipes
            .values()
            .flatten()
            .filter(|line| line.ingredient == ingredient)
            .collect()
    }

    pub fn stock_cell(&self, key: StockKey) -> Option<&StockCell> {
        self.stock.get(&key)
    }

    pub fn stock_cells(&self) -> Vec<&StockCell> {
        self.stock.values().collect()
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn sale(&self, id: SaleId) -> Option<&Sale> {
        self.sales.get(&id)
    }

    pub fn sales(&self) -> Vec<&Sale> {
        self.sales.values().collect()
    }

    pub fn replenishment_request(
        &self,
        id: ReplenishmentRequestId,
    ) -> Option<&ReplenishmentRequest> {
        self.replenishment_requests.get(&id)
    }

    pub fn replenishment_requests(&self) -> Vec<&ReplenishmentRequest> {
        self.replenishment_requests.values().collect()
    }

    pub fn purchase_order(&self, id: PurchaseOrderId) -> Option<&PurchaseOrder> {
        self.purchase_orders.get(&id)
    }

    pub fn purchase_orders(&self) -> Vec<&PurchaseOrder> {
        self.purchase_orders.values().collect()
    }

    pub fn stock_count(&self, id: StockCountId) -> Option<&StockCount> {
        self.stock_counts.get(&id)
    }

    pub fn stock_counts(&self) -> Vec<&StockCount> {
        self.stock_counts.values().collect()
    }

    // Writes. Only reachable through a unit of work.

    pub(crate) fn put_location(&mut self, location: Location) {
        upsert(&mut self.locations, location);
    }

    pub(crate) fn remove_location(&mut self, id: LocationId) -> Result<Location, StoreError> {
        self.locations.remove(&id).ok_or_else(|| missing("location", id))
    }

    pub(crate) fn put_product(&mut self, product: Product) {
        upsert(&mut self.products, product);
    }

    pub(crate) fn remove_product(&mut self, id: ProductId) -> Result<Product, StoreError> {
        self.recipes.remove(&id);
        self.products.remove(&id).ok_or_else(|| missing("product", id))
    }

    pub(crate) fn put_supplier(&mut self, supplier: Supplier) {
        upsert(&mut self.suppliers, supplier);
    }

    pub(crate) fn remove_supplier(&mut self, id: SupplierId) -> Result<Supplier, StoreError> {
        self.suppliers.remove(&id).ok_or_else(|| missing("supplier", id))
    }

    pub(crate) fn replace_recipe(&mut self, composite: ProductId, lines: Vec<RecipeLine>) {
        if lines.is_empty() {
            self.recipes.remove(&composite);
        } else {
            self.recipes.insert(composite, lines);
        }
    }

    fn cell_mut(&mut self, key: StockKey) -> &mut StockCell {
        self.stock.entry(key).or_insert_with(|| StockCell::empty(key))
    }

    pub(crate) fn adjust_stock(
        &mut self,
        key: StockKey,
        delta: Decimal,
    ) -> DomainResult<Decimal> {
        self.cell_mut(key).add(delta)
    }

    pub(crate) fn set_minimum_quantity(&mut self, key: StockKey, minimum: Decimal) {
        self.cell_mut(key).set_minimum_quantity(minimum);
    }

    pub(crate) fn append_movement(&mut self, movement: Movement) {
        self.movements.push(movement);
    }

    pub(crate) fn put_sale(&mut self, sale: Sale) {
        self.sales.insert(sale.id, sale);
    }

    pub(crate) fn remove_sale(&mut self, id: SaleId) -> Result<Sale, StoreError> {
        self.sales.remove(&id).ok_or_else(|| missing("sale", id))
    }

    pub(crate) fn put_replenishment_request(&mut self, request: ReplenishmentRequest) {
        self.replenishment_requests.insert(request.id_typed(), request);
    }

    pub(crate) fn put_purchase_order(&mut self, order: PurchaseOrder) {
        self.purchase_orders.insert(order.id_typed(), order);
    }

    pub(crate) fn put_stock_count(&mut self, count: StockCount) {
        self.stock_counts.insert(count.id_typed(), count);
    }
}

/// Anything that derefs to `Tables` (a lock guard, a unit of work's working
/// copy, a plain reference) is a reader.
impl<T> StoreReader for T
where
    T: Deref<Target = Tables>,
{
    fn location(&self, id: LocationId) -> Option<&Location> {
        Tables::location(self, id)
    }

    fn location_by_name(&self, name: &str) -> Option<&Location> {
        Tables::location_by_name(self, name)
    }

    fn locations(&self) -> Vec<&Location> {
        Tables::locations(self)
    }

    fn product(&self, id: ProductId) -> Option<&Product> {
        Tables::product(self, id)
    }

    fn product_by_name(&self, name: &str) -> Option<&Product> {
        Tables::product_by_name(self, name)
    }

    fn products(&self) -> Vec<&Product> {
        Tables::products(self)
    }

    fn supplier(&self, id: SupplierId) -> Option<&Supplier> {
        Tables::supplier(self, id)
    }

    fn supplier_by_name(&self, name: &str) -> Option<&Supplier> {
        Tables::supplier_by_name(self, name)
    }

    fn recipe(&self, composite: ProductId) -> &[RecipeLine] {
        Tables::recipe(self, composite)
    }

    fn recipes_using(&self, ingredient: ProductId) -> Vec<&RecipeLine> {
        Tables::recipes_using(self, ingredient)
    }

    fn stock_cell(&self, key: StockKey) -> Option<&StockCell> {
        Tables::stock_cell(self, key)
    }

    fn stock_cells(&self) -> Vec<&StockCell> {
        Tables::stock_cells(self)
    }

    fn movements(&self) -> &[Movement] {
        Tables::movements(self)
    }

    fn sale(&self, id: SaleId) -> Option<&Sale> {
        Tables::sale(self, id)
    }

    fn sales(&self) -> Vec<&Sale> {
        Tables::sales(self)
    }

    fn replenishment_request(&self, id: ReplenishmentRequestId) -> Option<&ReplenishmentRequest> {
        Tables::replenishment_request(self, id)
    }

    fn replenishment_requests(&self) -> Vec<&ReplenishmentRequest> {
        Tables::replenishment_requests(self)
    }

    fn purchase_order(&self, id: PurchaseOrderId) -> Option<&PurchaseOrder> {
        Tables::purchase_order(self, id)
    }

    fn purchase_orders(&self) -> Vec<&PurchaseOrder> {
        Tables::purchase_orders(self)
    }

    fn stock_count(&self, id: StockCountId) -> Option<&StockCount> {
        Tables::stock_count(self, id)
    }

    fn stock_counts(&self) -> Vec<&StockCount> {
        Tables::stock_counts(self)
    }
}

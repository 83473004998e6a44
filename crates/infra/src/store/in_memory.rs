use std::ops::Deref;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;

use boteco_catalog::{Location, Product, RecipeLine, Supplier};
use boteco_core::{DomainResult, LocationId, ProductId, SaleId, SupplierId};
use boteco_counting::StockCount;
use boteco_inventory::{Movement, StockKey};
use boteco_purchasing::PurchaseOrder;
use boteco_replenishment::ReplenishmentRequest;
use boteco_sales::Sale;

use crate::error::StoreError;

use super::r#trait::{InventoryStore, UnitOfWork};
use super::tables::Tables;

/// In-memory store.
///
/// Intended for tests/dev. A unit of work holds the write lock for its whole
/// lifetime and edits a private copy of the tables that replaces the
/// committed ones on `commit()`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InventoryStore for InMemoryStore {
    type Reader<'a> = RwLockReadGuard<'a, Tables>;
    type Tx<'a> = InMemoryUnitOfWork<'a>;

    fn read(&self) -> Result<Self::Reader<'_>, StoreError> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn begin(&self) -> Result<Self::Tx<'_>, StoreError> {
        let guard = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        let working = guard.clone();
        Ok(InMemoryUnitOfWork { guard, working })
    }
}

pub struct InMemoryUnitOfWork<'a> {
    guard: RwLockWriteGuard<'a, Tables>,
    working: Tables,
}

impl Deref for InMemoryUnitOfWork<'_> {
    type Target = Tables;

    fn deref(&self) -> &Tables {
        &self.working
    }
}

impl UnitOfWork for InMemoryUnitOfWork<'_> {
    fn put_location(&mut self, location: Location) {
        self.working.put_location(location);
    }

    fn remove_location(&mut self, id: LocationId) -> Result<Location, StoreError> {
        self.working.remove_location(id)
    }

    fn put_product(&mut self, product: Product) {
        self.working.put_product(product);
    }

    fn remove_product(&mut self, id: ProductId) -> Result<Product, StoreError> {
        self.working.remove_product(id)
    }

    fn put_supplier(&mut self, supplier: Supplier) {
        self.working.put_supplier(supplier);
    }

    fn remove_supplier(&mut self, id: SupplierId) -> Result<Supplier, StoreError> {
        self.working.remove_supplier(id)
    }

    fn replace_recipe(&mut self, composite: ProductId, lines: Vec<RecipeLine>) {
        self.working.replace_recipe(composite, lines);
    }

    fn adjust_stock(&mut self, key: StockKey, delta: Decimal) -> DomainResult<Decimal> {
        self.working.adjust_stock(key, delta)
    }

    fn set_minimum_quantity(&mut self, key: StockKey, minimum: Decimal) {
        self.working.set_minimum_quantity(key, minimum);
    }

    fn append_movement(&mut self, movement: Movement) {
        self.working.append_movement(movement);
    }

    fn put_sale(&mut self, sale: Sale) {
        self.working.put_sale(sale);
    }

    fn remove_sale(&mut self, id: SaleId) -> Result<Sale, StoreError> {
        self.working.remove_sale(id)
    }

    fn put_replenishment_request(&mut self, request: ReplenishmentRequest) {
        self.working.put_replenishment_request(request);
    }

    fn put_purchase_order(&mut self, order: PurchaseOrder) {
        self.working.put_purchase_order(order);
    }

    fn put_stock_count(&mut self, count: StockCount) {
        self.working.put_stock_count(count);
    }

    fn commit(self) -> Result<(), StoreError> {
        let InMemoryUnitOfWork { mut guard, working } = self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreReader;
    use boteco_core::ProductId;
    use rust_decimal_macros::dec;

    fn key() -> StockKey {
        StockKey::new(LocationId::new(), ProductId::new())
    }

    #[test]
    fn committed_writes_become_visible() {
        let store = InMemoryStore::new();
        let k = key();

        let mut tx = store.begin().unwrap();
        assert_eq!(tx.adjust_stock(k, dec!(5)).unwrap(), dec!(5));
        assert_eq!(tx.adjust_stock(k, dec!(-2)).unwrap(), dec!(3));
        tx.commit().unwrap();

        let reader = store.read().unwrap();
        assert_eq!(reader.stock_level(k.location, k.product), dec!(3));
    }

    #[test]
    fn dropping_a_unit_of_work_rolls_it_back() {
        let store = InMemoryStore::new();
        let k = key();
        {
            let mut tx = store.begin().unwrap();
            tx.adjust_stock(k, dec!(7)).unwrap();
            tx.set_minimum_quantity(k, dec!(2));
        }
        let reader = store.read().unwrap();
        assert!(reader.stock_cell(k).is_none());
    }

    #[test]
    fn minimum_threshold_never_touches_quantity() {
        let store = InMemoryStore::new();
        let k = key();
        let mut tx = store.begin().unwrap();
        tx.adjust_stock(k, dec!(4)).unwrap();
        tx.set_minimum_quantity(k, dec!(10));
        tx.commit().unwrap();

        let reader = store.read().unwrap();
        let cell = reader.stock_cell(k).unwrap();
        assert_eq!(cell.quantity(), dec!(4));
        assert_eq!(cell.minimum_quantity(), dec!(10));
    }
}

use rust_decimal::Decimal;

use boteco_catalog::{Location, Product, RecipeLine, Supplier};
use boteco_core::{
    DomainResult, LocationId, ProductId, PurchaseOrderId, ReplenishmentRequestId, SaleId,
    StockCountId, SupplierId,
};
use boteco_counting::StockCount;
use boteco_inventory::{Movement, StockCell, StockKey};
use boteco_purchasing::PurchaseOrder;
use boteco_replenishment::ReplenishmentRequest;
use boteco_sales::Sale;

use crate::error::StoreError;

/// Consistent read view over every table.
pub trait StoreReader {
    fn location(&self, id: LocationId) -> Option<&Location>;
    fn location_by_name(&self, name: &str) -> Option<&Location>;
    fn locations(&self) -> Vec<&Location>;

    fn product(&self, id: ProductId) -> Option<&Product>;
    fn product_by_name(&self, name: &str) -> Option<&Product>;
    fn products(&self) -> Vec<&Product>;

    fn supplier(&self, id: SupplierId) -> Option<&Supplier>;
    fn supplier_by_name(&self, name: &str) -> Option<&Supplier>;

    /// Recipe lines owned by `composite` (empty if none).
    fn recipe(&self, composite: ProductId) -> &[RecipeLine];
    /// Every recipe line in which `ingredient` is a component.
    fn recipes_using(&self, ingredient: ProductId) -> Vec<&RecipeLine>;

    fn stock_cell(&self, key: StockKey) -> Option<&StockCell>;
    fn stock_cells(&self) -> Vec<&StockCell>;

    /// The movement log, in application order.
    fn movements(&self) -> &[Movement];

    fn sale(&self, id: SaleId) -> Option<&Sale>;
    fn sales(&self) -> Vec<&Sale>;

    fn replenishment_request(&self, id: ReplenishmentRequestId) -> Option<&ReplenishmentRequest>;
    fn replenishment_requests(&self) -> Vec<&ReplenishmentRequest>;

    fn purchase_order(&self, id: PurchaseOrderId) -> Option<&PurchaseOrder>;
    fn purchase_orders(&self) -> Vec<&PurchaseOrder>;

    fn stock_count(&self, id: StockCountId) -> Option<&StockCount>;
    fn stock_counts(&self) -> Vec<&StockCount>;

    /// Quantity of `product` at `location`; 0 when no cell exists yet.
    fn stock_level(&self, location: LocationId, product: ProductId) -> Decimal {
        self.stock_cell(StockKey::new(location, product))
            .map(StockCell::quantity)
            .unwrap_or(Decimal::ZERO)
    }
}

/// An atomic unit of work.
///
/// Writes are visible to the unit's own reads immediately and to everyone
/// else only after `commit()`. Dropping the unit without committing discards
/// every write.
pub trait UnitOfWork: StoreReader {
    fn put_location(&mut self, location: Location);
    fn remove_location(&mut self, id: LocationId) -> Result<Location, StoreError>;

    fn put_product(&mut self, product: Product);
    fn remove_product(&mut self, id: ProductId) -> Result<Product, StoreError>;

    fn put_supplier(&mut self, supplier: Supplier);
    fn remove_supplier(&mut self, id: SupplierId) -> Result<Supplier, StoreError>;

    /// Replace the whole recipe of `composite`.
    fn replace_recipe(&mut self, composite: ProductId, lines: Vec<RecipeLine>);

    /// Relative update of a cell quantity, creating the cell at 0 first if
    /// needed. Returns the new quantity; a result out of range is a
    /// validation error and the unit of work must be dropped.
    fn adjust_stock(&mut self, key: StockKey, delta: Decimal) -> DomainResult<Decimal>;

    /// Change only the reorder threshold, creating the cell at 0 if needed.
    fn set_minimum_quantity(&mut self, key: StockKey, minimum: Decimal);

    fn append_movement(&mut self, movement: Movement);

    fn put_sale(&mut self, sale: Sale);
    fn remove_sale(&mut self, id: SaleId) -> Result<Sale, StoreError>;

    fn put_replenishment_request(&mut self, request: ReplenishmentRequest);
    fn put_purchase_order(&mut self, order: PurchaseOrder);
    fn put_stock_count(&mut self, count: StockCount);

    fn commit(self) -> Result<(), StoreError>;
}

/// Storage backend for the inventory core.
pub trait InventoryStore: Send + Sync {
    type Reader<'a>: StoreReader
    where
        Self: 'a;

    type Tx<'a>: UnitOfWork
    where
        Self: 'a;

    fn read(&self) -> Result<Self::Reader<'_>, StoreError>;

    /// Start a unit of work. Writers are serialized.
    fn begin(&self) -> Result<Self::Tx<'_>, StoreError>;
}

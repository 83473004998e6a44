//! Purchasing domain module (purchase orders placed with suppliers).
//!
//! Business rules only (no IO, no storage). Receiving an order yields the
//! stock entries the infrastructure layer applies at the central hub.

pub mod order;

pub use order::{
    AddLine, CancelPurchaseOrder, CreatePurchaseOrder, GoodsReceived, PurchaseLine, PurchaseOrder,
    PurchaseOrderCancelled, PurchaseOrderCommand, PurchaseOrderCreated, PurchaseOrderEvent,
    PurchaseOrderLineAdded, PurchaseOrderStatus, ReceiveGoods,
};

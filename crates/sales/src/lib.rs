//! Sale Orders domain module.
//!
//! Business rules for sale orders, implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage). The host owns persistence and runs the
//! confirmation hooks.

pub mod order;

pub use order::{
    AddLine, CancelOrder, ConfirmOrder, CreateSaleOrder, LineAdded, LockOrder, OrderCancelled,
    OrderConfirmed, OrderLine, OrderLocked, SaleOrder, SaleOrderCommand, SaleOrderCreated,
    SaleOrderEvent, SaleOrderId, SaleOrderStatus,
};

//! Stock pickings (goods movements) domain module.
//!
//! Business rules for pickings, implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage). The host owns persistence and runs the
//! validation hooks.

pub mod picking;

pub use picking::{
    AddMove, CancelPicking, CreatePicking, MarkTodo, MoveAdded, MoveQuantitySet, PickingCancelled,
    PickingCreated, PickingId, PickingMarkedTodo, PickingStatus, PickingType, PickingValidated,
    SetMoveQuantity, StockMove, StockPicking, StockPickingCommand, StockPickingEvent,
    ValidatePicking,
};

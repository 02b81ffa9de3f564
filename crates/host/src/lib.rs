//! `saledash-host`: the minimal business host the dashboard module extends.
//!
//! The host owns the records (products, sale orders, stock pickings), runs
//! their default transitions and builds the default session payload. Modules
//! never override host behavior; they register on explicit extension points:
//!
//! - [`TransitionHook`]s run after a successful order confirmation or picking
//!   validation, on the caller's thread, in registration order.
//! - [`SessionInfoAugmenter`]s add fields to the session payload.
//!
//! A failing hook stops the chain and its error reaches the caller unchanged
//! inside [`HostError::Hook`]. Record changes made by the default transition
//! are kept; there is no rollback.

pub mod error;
pub mod hooks;
pub mod host;
pub mod query;
pub mod session;
pub mod store;

pub use error::HostError;
pub use hooks::{ExtensionPoint, TransitionHook};
pub use host::{Host, HostInfo, NewPicking, NewSaleOrder};
pub use query::SaleOrderFilter;
pub use session::{SessionInfo, SessionInfoAugmenter};
pub use store::{IdSequence, InMemoryRecordStore, RecordStore, StoreError};

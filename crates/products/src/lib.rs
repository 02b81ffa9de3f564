//! Product catalog entries referenced by order lines and stock moves.
//!
//! The dashboard only needs what a product costs and which category it rolls
//! up into, so this stays a plain validated record rather than an aggregate.

pub mod product;

pub use product::{Product, ProductId};

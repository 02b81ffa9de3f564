//! `saledash-core`: record primitives shared by every business crate.
//!
//! Ids, the record state machine traits and the shared error type. No IO.

pub mod aggregate;
pub mod error;
pub mod id;

pub use aggregate::{Aggregate, AggregateRoot};
pub use error::{DomainError, DomainResult};
pub use id::{RecordId, UserId};

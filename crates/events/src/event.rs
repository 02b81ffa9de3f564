use chrono::{DateTime, Utc};

/// A fact recorded by a sale order or picking transition.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name such as `sale.order.confirmed`, used in traces.
    fn event_type(&self) -> &'static str;

    fn version(&self) -> u32;

    /// Business time of the transition, which also stamps `date_order` and
    /// `date_done`.
    fn occurred_at(&self) -> DateTime<Utc>;
}

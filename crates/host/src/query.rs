use chrono::{DateTime, Utc};

use saledash_core::UserId;
use saledash_sales::{SaleOrder, SaleOrderStatus};

/// Search criteria for sale orders. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleOrderFilter {
    pub states: Vec<SaleOrderStatus>,
    pub salesperson: Option<UserId>,
    /// Inclusive lower bound on the order date.
    pub date_from: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl SaleOrderFilter {
    /// Confirmed or locked orders of one salesperson.
    pub fn sales_of(user: UserId) -> Self {
        Self {
            states: vec![SaleOrderStatus::Sale, SaleOrderStatus::Done],
            salesperson: Some(user),
            ..Self::default()
        }
    }

    pub fn since(mut self, date_from: DateTime<Utc>) -> Self {
        self.date_from = Some(date_from);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, order: &SaleOrder) -> bool {
        if !self.states.is_empty() && !self.states.contains(&order.status()) {
            return false;
        }
        if let Some(user) = self.salesperson {
            if order.salesperson() != Some(user) {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            match order.date_order() {
                Some(d) if d >= from => {}
                _ => return false,
            }
        }
        true
    }
}

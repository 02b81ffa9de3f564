//! Chart series computed from confirmed orders.
//!
//! Callers pass orders already narrowed to the chart window; these functions
//! only group and rank.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use saledash_products::{Product, ProductId};
use saledash_sales::SaleOrder;

/// Revenue per day, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesTrend {
    /// `YYYY-MM-DD`, UTC.
    pub labels: Vec<String>,
    pub revenue: Vec<u64>,
}

impl SalesTrend {
    /// Group by UTC calendar day and keep the latest `points` days.
    pub fn compute(orders: &[SaleOrder], points: usize) -> Self {
        let mut per_day: BTreeMap<chrono::NaiveDate, u64> = BTreeMap::new();
        for order in orders {
            if let Some(date) = order.date_order() {
                let day = per_day.entry(date.date_naive()).or_default();
                *day = day.saturating_add(order.amount_total());
            }
        }

        let skip = per_day.len().saturating_sub(points);
        let (labels, revenue) = per_day
            .into_iter()
            .skip(skip)
            .map(|(day, amount)| (day.format("%Y-%m-%d").to_string(), amount))
            .unzip();

        Self { labels, revenue }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Revenue against cost of goods sold, per product category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueCogs {
    pub labels: Vec<String>,
    pub revenue: Vec<u64>,
    pub cogs: Vec<u64>,
}

impl RevenueCogs {
    /// Sum line revenue (quantity × unit price) and cost (quantity × standard
    /// price) per category, then keep the `top` categories by revenue.
    ///
    /// Lines whose product `lookup` does not know are skipped.
    pub fn compute<F>(orders: &[SaleOrder], lookup: F, top: usize) -> Self
    where
        F: Fn(ProductId) -> Option<Product>,
    {
        let mut per_category: BTreeMap<String, (u64, u64)> = BTreeMap::new();

        for line in orders.iter().flat_map(|o| o.lines()) {
            let Some(product) = lookup(line.product_id) else {
                continue;
            };
            let qty = line.quantity.max(0) as u64;
            let entry = per_category.entry(product.category().to_string()).or_default();
            entry.0 = entry.0.saturating_add(line.subtotal());
            entry.1 = entry.1.saturating_add(qty.saturating_mul(product.standard_price()));
        }

        let mut ranked: Vec<(String, (u64, u64))> = per_category.into_iter().collect();
        // BTreeMap order makes equal revenues fall back to the category name.
        ranked.sort_by(|a, b| b.1.0.cmp(&a.1.0));
        ranked.truncate(top);

        let mut out = Self::default();
        for (category, (revenue, cogs)) in ranked {
            out.labels.push(category);
            out.revenue.push(revenue);
            out.cogs.push(cogs);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

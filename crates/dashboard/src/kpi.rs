use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use saledash_sales::SaleOrder;

/// Headline numbers shown at the top of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardKpis {
    pub total_orders: u64,
    pub total_revenue: u64,
    /// Orders dated on or after the start of the current UTC day.
    pub orders_today: u64,
    /// Revenue per order, rounded down. Zero without orders.
    pub average_order_value: u64,
}

impl DashboardKpis {
    pub fn compute(orders: &[SaleOrder], now: DateTime<Utc>) -> Self {
        let start_of_day = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|d| d.and_utc())
            .unwrap_or(now);

        let total_orders = orders.len() as u64;
        let total_revenue = orders
            .iter()
            .map(SaleOrder::amount_total)
            .fold(0, u64::saturating_add);
        let orders_today = orders
            .iter()
            .filter(|o| o.date_order().is_some_and(|d| d >= start_of_day))
            .count() as u64;

        let average_order_value = total_revenue.checked_div(total_orders).unwrap_or(0);

        Self {
            total_orders,
            total_revenue,
            orders_today,
            average_order_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::confirmed_order;
    use chrono::{Duration, TimeZone};

    #[test]
    fn revenue_saturates_instead_of_overflowing() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 15, 0, 0).unwrap();
        let big = u64::MAX / 2 + 1;
        let orders = vec![
            confirmed_order(1, now, &[(1, 1, big)]),
            confirmed_order(2, now, &[(1, 1, big)]),
        ];

        let kpis = DashboardKpis::compute(&orders, now);
        assert_eq!(kpis.total_revenue, u64::MAX);
        assert_eq!(kpis.average_order_value, u64::MAX / 2);
    }

    #[test]
    fn empty_input_is_all_zero() {
        assert_eq!(DashboardKpis::compute(&[], Utc::now()), DashboardKpis::default());
    }

    #[test]
    fn counts_today_from_utc_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 15, 0, 0).unwrap();
        let orders = vec![
            confirmed_order(1, now - Duration::hours(1), &[(1, 1, 100)]),
            confirmed_order(2, Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap(), &[(1, 2, 125)]),
            confirmed_order(3, now - Duration::days(1), &[(1, 1, 51)]),
        ];

        let kpis = DashboardKpis::compute(&orders, now);
        assert_eq!(kpis.total_orders, 3);
        assert_eq!(kpis.total_revenue, 401);
        assert_eq!(kpis.orders_today, 2);
        assert_eq!(kpis.average_order_value, 133);
    }
}

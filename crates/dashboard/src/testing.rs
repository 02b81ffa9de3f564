//! Fixtures shared by the unit tests.

use chrono::{DateTime, Utc};

use saledash_core::{RecordId, UserId};
use saledash_events::execute;
use saledash_products::ProductId;
use saledash_sales::{AddLine, ConfirmOrder, CreateSaleOrder, SaleOrder, SaleOrderCommand, SaleOrderId};

/// A confirmed order of user 5 dated `at`, one line per `(product, qty, price)`.
pub(crate) fn confirmed_order(id: u64, at: DateTime<Utc>, lines: &[(u64, i64, u64)]) -> SaleOrder {
    let order_id = SaleOrderId::new(RecordId::new(id));
    let mut order = SaleOrder::empty(order_id);

    let mut commands = vec![SaleOrderCommand::CreateSaleOrder(CreateSaleOrder {
        order_id,
        salesperson: UserId::new(5),
        date_order: at,
    })];
    commands.extend(lines.iter().map(|&(product, quantity, price_unit)| {
        SaleOrderCommand::AddLine(AddLine {
            order_id,
            product_id: ProductId::new(RecordId::new(product)),
            quantity,
            price_unit,
            occurred_at: at,
        })
    }));
    commands.push(SaleOrderCommand::ConfirmOrder(ConfirmOrder {
        order_id,
        occurred_at: at,
    }));

    for cmd in &commands {
        execute(&mut order, cmd).unwrap();
    }
    order
}

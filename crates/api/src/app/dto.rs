use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use saledash_inventory::{PickingStatus, PickingType, StockMove, StockPicking};
use saledash_products::Product;
use saledash_sales::{OrderLine, SaleOrder, SaleOrderStatus};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub category: String,
    pub standard_price: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSaleOrderRequest {
    pub id: Option<u64>,
    pub salesperson: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AddOrderLineRequest {
    pub product_id: u64,
    pub quantity: i64,
    pub price_unit: u64,
}

#[derive(Debug, Deserialize)]
pub struct ListSaleOrdersQuery {
    /// Comma-separated states, e.g. `sale,done`.
    pub state: Option<String>,
    pub salesperson: Option<u64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePickingRequest {
    pub id: Option<u64>,
    pub picking_type: PickingType,
    pub origin: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddMoveRequest {
    pub product_id: u64,
    pub product_uom_qty: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetMoveQuantityRequest {
    pub quantity: i64,
}

/// Body of the chart layout add/remove calls, e.g. `{"chart": "sales-trend-chart"}`.
#[derive(Debug, Deserialize)]
pub struct ChartLayoutRequest {
    pub chart: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct OfflineQuery {
    #[serde(default)]
    pub offline: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamQuery {
    /// Comma-separated channel names.
    pub channels: Option<String>,
}

impl StreamQuery {
    pub fn channel_list(&self, fallback: &str) -> Vec<String> {
        let listed: Vec<String> = self
            .channels
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        if listed.is_empty() {
            vec![fallback.to_string()]
        } else {
            listed
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: u64,
    pub name: String,
    pub category: String,
    pub standard_price: u64,
}

impl From<&Product> for ProductView {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id().get(),
            name: p.name().to_string(),
            category: p.category().to_string(),
            standard_price: p.standard_price(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderLineView {
    pub line_no: u32,
    pub product_id: u64,
    pub quantity: i64,
    pub price_unit: u64,
    pub subtotal: u64,
}

impl From<&OrderLine> for OrderLineView {
    fn from(l: &OrderLine) -> Self {
        Self {
            line_no: l.line_no,
            product_id: l.product_id.get(),
            quantity: l.quantity,
            price_unit: l.price_unit,
            subtotal: l.subtotal(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SaleOrderView {
    pub id: u64,
    pub state: SaleOrderStatus,
    pub salesperson: Option<u64>,
    pub date_order: Option<DateTime<Utc>>,
    pub amount_total: u64,
    pub lines: Vec<OrderLineView>,
}

impl From<&SaleOrder> for SaleOrderView {
    fn from(o: &SaleOrder) -> Self {
        Self {
            id: o.id_typed().get(),
            state: o.status(),
            salesperson: o.salesperson().map(|u| u.get()),
            date_order: o.date_order(),
            amount_total: o.amount_total(),
            lines: o.lines().iter().map(OrderLineView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StockMoveView {
    pub move_no: u32,
    pub product_id: u64,
    pub product_uom_qty: i64,
    pub quantity: i64,
}

impl From<&StockMove> for StockMoveView {
    fn from(m: &StockMove) -> Self {
        Self {
            move_no: m.move_no,
            product_id: m.product_id.get(),
            product_uom_qty: m.product_uom_qty,
            quantity: m.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PickingView {
    pub id: u64,
    pub picking_type: PickingType,
    pub origin: Option<String>,
    pub state: PickingStatus,
    pub date_done: Option<DateTime<Utc>>,
    pub moves: Vec<StockMoveView>,
}

impl From<&StockPicking> for PickingView {
    fn from(p: &StockPicking) -> Self {
        Self {
            id: p.id_typed().get(),
            picking_type: p.picking_type(),
            origin: p.origin().map(str::to_string),
            state: p.status(),
            date_done: p.date_done(),
            moves: p.moves().iter().map(StockMoveView::from).collect(),
        }
    }
}

/// Parse `sale,done` into states; unknown names are an error.
pub fn parse_states(raw: &str) -> Result<Vec<SaleOrderStatus>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s {
            "draft" => Ok(SaleOrderStatus::Draft),
            "sale" => Ok(SaleOrderStatus::Sale),
            "done" => Ok(SaleOrderStatus::Done),
            "cancel" => Ok(SaleOrderStatus::Cancel),
            other => Err(format!("unknown sale order state '{other}'")),
        })
        .collect()
}

//! Business event hook: tells live dashboards that sales data changed.

use serde_json::Value as JsonValue;
use tracing::info;

use saledash_auth::SessionContext;
use saledash_events::NotificationPublisher;
use saledash_host::TransitionHook;
use saledash_inventory::StockPicking;
use saledash_sales::SaleOrder;

use crate::config::MESSAGE_TYPE;

/// Publishes one notification carrying the record id after an order is
/// confirmed or a picking is validated.
///
/// Both transitions share one channel, so the payload alone does not say
/// which kind of record changed.
#[derive(Debug)]
pub struct SaleUpdateNotifier<P> {
    publisher: P,
    channel: String,
}

impl<P: NotificationPublisher> SaleUpdateNotifier<P> {
    pub fn new(publisher: P, channel: impl Into<String>) -> Self {
        Self {
            publisher,
            channel: channel.into(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    fn notify(&self, record_id: u64) -> anyhow::Result<()> {
        self.publisher
            .send_one(&self.channel, MESSAGE_TYPE, JsonValue::from(record_id))?;
        info!(channel = %self.channel, record_id, "sale update published");
        Ok(())
    }
}

impl<P: NotificationPublisher> TransitionHook<SaleOrder> for SaleUpdateNotifier<P> {
    fn name(&self) -> &str {
        "sale_dashboard.order_confirmed"
    }

    fn after_transition(&self, _ctx: &SessionContext, order: &SaleOrder) -> anyhow::Result<()> {
        self.notify(order.id_typed().get())
    }
}

impl<P: NotificationPublisher> TransitionHook<StockPicking> for SaleUpdateNotifier<P> {
    fn name(&self) -> &str {
        "sale_dashboard.picking_validated"
    }

    fn after_transition(&self, _ctx: &SessionContext, picking: &StockPicking) -> anyhow::Result<()> {
        self.notify(picking.id_typed().get())
    }
}

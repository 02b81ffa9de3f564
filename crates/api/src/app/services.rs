//! Service wiring: host, bus, module install and dashboard service.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio::sync::mpsc::unbounded_channel;
use tokio_stream::wrappers::UnboundedReceiverStream;

use saledash_auth::SessionContext;
use saledash_core::RecordId;
use saledash_dashboard::{DashboardRefresher, DashboardService, WorkerHandle};
use saledash_events::{ChannelSubscription, EventBus, InMemoryEventBus, Notification};
use saledash_host::{Host, HostInfo};
use saledash_sales::SaleOrderId;

use crate::config::ApiConfig;

/// Shared application services.
#[derive(Debug)]
pub struct AppServices {
    pub host: Arc<Host>,
    pub bus: Arc<InMemoryEventBus<Notification>>,
    pub dashboard: Arc<DashboardService>,
    pub config: ApiConfig,
}

impl AppServices {
    /// Build the host with the sale dashboard module installed.
    pub fn new(config: ApiConfig) -> Self {
        let bus = Arc::new(InMemoryEventBus::<Notification>::new());

        let mut host = Host::new(HostInfo {
            db_name: config.db_name.clone(),
            ..HostInfo::default()
        });
        saledash_dashboard::install(&mut host, bus.clone(), &config.dashboard);
        let host = Arc::new(host);

        let dashboard = Arc::new(DashboardService::new(host.clone(), config.dashboard.clone()));

        Self {
            host,
            bus,
            dashboard,
            config,
        }
    }

    /// Keep salespeople's cached KPIs current as sale updates arrive.
    ///
    /// The payload is only a record id on a channel shared with pickings, so
    /// an id that also names a sale order refreshes that order's owner.
    pub fn start_refresher(&self) -> std::io::Result<WorkerHandle> {
        let host = self.host.clone();
        let dashboard = self.dashboard.clone();
        let public_user = self.config.dashboard.public_user;

        DashboardRefresher::spawn(
            "dashboard-refresher",
            &*self.bus,
            [self.config.dashboard.channel.clone()],
            saledash_dashboard::MESSAGE_TYPE,
            move |n: Notification| -> anyhow::Result<()> {
                let Some(id) = n.payload.as_u64().filter(|v| *v > 0).map(RecordId::new) else {
                    return Ok(());
                };
                let Some(salesperson) = host.sale_order(SaleOrderId::new(id)).and_then(|o| o.salesperson()) else {
                    return Ok(());
                };
                if salesperson == public_user {
                    return Ok(());
                }

                let ctx = SessionContext::authenticated(salesperson, "", "");
                dashboard.kpis(&ctx, false)?;
                tracing::debug!(user_id = %salesperson, order_id = %id, "dashboard cache refreshed");
                Ok(())
            },
        )
    }
}

/// SSE stream of bus notifications on `channels`.
///
/// A blocking task drains the bus subscription and forwards matches until
/// the client goes away.
pub fn notification_sse_stream(
    services: Arc<AppServices>,
    channels: Vec<String>,
) -> Sse<UnboundedReceiverStream<Result<SseEvent, Infallible>>> {
    let (tx, rx) = unbounded_channel::<Result<SseEvent, Infallible>>();

    let mut sub = ChannelSubscription::new(services.bus.subscribe());
    for channel in channels {
        sub.add_channel(channel);
    }

    tokio::task::spawn_blocking(move || {
        loop {
            match sub.recv_timeout(Duration::from_millis(1000)) {
                Ok(n) => {
                    let data = serde_json::to_string(&n.payload).unwrap_or_else(|_| "null".to_string());
                    let event = SseEvent::default().event(n.message_type.as_str()).data(data);
                    if tx.send(Ok(event)).is_err() {
                        break;
                    }
                }
                Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                    if tx.is_closed() {
                        break;
                    }
                }
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        tracing::debug!("bus stream closed");
    });

    Sse::new(UnboundedReceiverStream::new(rx)).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

//! `saledash-dashboard`: the sale dashboard module.
//!
//! Installs two things on the host:
//!
//! - a [`SaleUpdateNotifier`] on order confirmation and picking validation,
//!   publishing `(channel, "notification", record id)` on the bus;
//! - a [`CurrentUserAugmenter`] adding `current_user` to the session info.
//!
//! On top of that it serves the dashboard data itself (KPIs, chart series,
//! offline cache, edit mode) and a [`DashboardRefresher`] that reloads on
//! each sale update.

pub mod cache;
pub mod charts;
pub mod config;
pub mod error;
pub mod kpi;
pub mod live;
pub mod manifest;
pub mod notifier;
pub mod service;
pub mod session;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use saledash_events::NotificationPublisher;
use saledash_host::Host;

pub use cache::{CacheStore, ChartKind, ChartLayoutState, DashboardCache, EditModeState};
pub use charts::{RevenueCogs, SalesTrend};
pub use config::{
    CURRENT_USER_FIELD, ConfigError, DEFAULT_CHANNEL, DEFAULT_PUBLIC_USER, DashboardConfig,
    MESSAGE_TYPE,
};
pub use error::DashboardError;
pub use kpi::DashboardKpis;
pub use live::{DashboardRefresher, WorkerHandle};
pub use manifest::ModuleManifest;
pub use notifier::SaleUpdateNotifier;
pub use service::DashboardService;
pub use session::CurrentUserAugmenter;

/// Register the module's hooks on `host`.
pub fn install<P>(host: &mut Host, publisher: P, config: &DashboardConfig)
where
    P: NotificationPublisher + 'static,
{
    let notifier = Arc::new(SaleUpdateNotifier::new(publisher, config.channel.clone()));
    host.on_order_confirmed(notifier.clone());
    host.on_picking_validated(notifier);
    host.on_session_info(Arc::new(CurrentUserAugmenter));

    tracing::info!(channel = %config.channel, "sale dashboard installed");
}

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use saledash_auth::SessionContext;
use saledash_core::UserId;
use saledash_host::{Host, SaleOrderFilter};
use saledash_sales::SaleOrder;

use crate::cache::{
    CHART_LAYOUT_KEY, CacheStore, ChartKind, ChartLayoutState, DashboardCache, EDIT_MODE_KEY,
    EditModeState, MAIN_KEY, REVENUE_COGS_KEY, SALES_TREND_KEY,
};
use crate::charts::{RevenueCogs, SalesTrend};
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::kpi::DashboardKpis;

/// Dashboard data for the requesting user.
///
/// Live loads read the host and write through to that user's cache. Offline
/// loads only read the cache.
#[derive(Debug)]
pub struct DashboardService {
    host: Arc<Host>,
    config: DashboardConfig,
    caches: RwLock<HashMap<UserId, Arc<DashboardCache>>>,
}

impl DashboardService {
    pub fn new(host: Arc<Host>, config: DashboardConfig) -> Self {
        Self {
            host,
            config,
            caches: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn cache_for(&self, user: UserId) -> Result<Arc<DashboardCache>, DashboardError> {
        if let Some(cache) = self
            .caches
            .read()
            .map_err(|_| DashboardError::CachePoisoned)?
            .get(&user)
        {
            return Ok(cache.clone());
        }
        let mut caches = self.caches.write().map_err(|_| DashboardError::CachePoisoned)?;
        Ok(caches.entry(user).or_default().clone())
    }

    pub fn kpis(&self, ctx: &SessionContext, offline: bool) -> Result<DashboardKpis, DashboardError> {
        self.kpis_at(ctx, offline, Utc::now())
    }

    pub fn kpis_at(
        &self,
        ctx: &SessionContext,
        offline: bool,
        now: DateTime<Utc>,
    ) -> Result<DashboardKpis, DashboardError> {
        self.load(ctx, offline, CacheStore::DashboardData, MAIN_KEY, || {
            let orders = self.host.search_sale_orders(&self.sales_filter(ctx));
            DashboardKpis::compute(&orders, now)
        })
    }

    pub fn sales_trend(&self, ctx: &SessionContext, offline: bool) -> Result<SalesTrend, DashboardError> {
        self.sales_trend_at(ctx, offline, Utc::now())
    }

    pub fn sales_trend_at(
        &self,
        ctx: &SessionContext,
        offline: bool,
        now: DateTime<Utc>,
    ) -> Result<SalesTrend, DashboardError> {
        self.load(ctx, offline, CacheStore::ChartData, SALES_TREND_KEY, || {
            SalesTrend::compute(&self.window_orders(ctx, now), self.config.trend_points)
        })
    }

    pub fn revenue_cogs(&self, ctx: &SessionContext, offline: bool) -> Result<RevenueCogs, DashboardError> {
        self.revenue_cogs_at(ctx, offline, Utc::now())
    }

    pub fn revenue_cogs_at(
        &self,
        ctx: &SessionContext,
        offline: bool,
        now: DateTime<Utc>,
    ) -> Result<RevenueCogs, DashboardError> {
        self.load(ctx, offline, CacheStore::ChartData, REVENUE_COGS_KEY, || {
            RevenueCogs::compute(
                &self.window_orders(ctx, now),
                |id| self.host.product(id),
                self.config.top_categories,
            )
        })
    }

    pub fn edit_mode(&self, ctx: &SessionContext) -> Result<EditModeState, DashboardError> {
        let cache = self.cache_for(ctx.user_id())?;
        Ok(cache
            .get(CacheStore::DashboardData, EDIT_MODE_KEY)?
            .unwrap_or_default())
    }

    pub fn toggle_edit_mode(&self, ctx: &SessionContext) -> Result<EditModeState, DashboardError> {
        let next = self.edit_mode(ctx)?.toggled();
        self.store_edit_mode(ctx, next)
    }

    pub fn close_edit_mode(&self, ctx: &SessionContext) -> Result<EditModeState, DashboardError> {
        self.store_edit_mode(ctx, EditModeState::closed())
    }

    fn store_edit_mode(&self, ctx: &SessionContext, state: EditModeState) -> Result<EditModeState, DashboardError> {
        self.cache_for(ctx.user_id())?
            .set(CacheStore::DashboardData, EDIT_MODE_KEY, &state)?;
        debug!(user_id = %ctx.user_id(), is_edit_mode = state.is_edit_mode, "edit mode stored");
        Ok(state)
    }

    pub fn chart_layout(&self, ctx: &SessionContext) -> Result<ChartLayoutState, DashboardError> {
        let cache = self.cache_for(ctx.user_id())?;
        Ok(cache
            .get(CacheStore::DashboardData, CHART_LAYOUT_KEY)?
            .unwrap_or_default())
    }

    /// Place `chart` in the drop zone. Placing it twice is a no-op.
    pub fn add_chart(&self, ctx: &SessionContext, chart: ChartKind) -> Result<ChartLayoutState, DashboardError> {
        let next = self.chart_layout(ctx)?.with(chart, true);
        self.store_chart_layout(ctx, chart, next)
    }

    pub fn remove_chart(&self, ctx: &SessionContext, chart: ChartKind) -> Result<ChartLayoutState, DashboardError> {
        let next = self.chart_layout(ctx)?.with(chart, false);
        self.store_chart_layout(ctx, chart, next)
    }

    fn store_chart_layout(
        &self,
        ctx: &SessionContext,
        chart: ChartKind,
        layout: ChartLayoutState,
    ) -> Result<ChartLayoutState, DashboardError> {
        self.cache_for(ctx.user_id())?
            .set(CacheStore::DashboardData, CHART_LAYOUT_KEY, &layout)?;
        debug!(user_id = %ctx.user_id(), %chart, shown = layout.shows(chart), "chart layout stored");
        Ok(layout)
    }

    fn sales_filter(&self, ctx: &SessionContext) -> SaleOrderFilter {
        SaleOrderFilter::sales_of(ctx.user_id()).limit(self.config.search_limit)
    }

    fn window_orders(&self, ctx: &SessionContext, now: DateTime<Utc>) -> Vec<SaleOrder> {
        let from = now - Duration::days(i64::from(self.config.trend_window_days));
        self.host.search_sale_orders(&self.sales_filter(ctx).since(from))
    }

    fn load<T, F>(
        &self,
        ctx: &SessionContext,
        offline: bool,
        store: CacheStore,
        key: &str,
        compute: F,
    ) -> Result<T, DashboardError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        let cache = self.cache_for(ctx.user_id())?;

        if offline {
            debug!(user_id = %ctx.user_id(), %store, key, "loading dashboard data from cache");
            return cache
                .get(store, key)?
                .ok_or_else(|| DashboardError::OfflineCacheMiss {
                    store,
                    key: key.to_string(),
                });
        }

        let value = compute();
        cache.set(store, key, &value)?;
        Ok(value)
    }
}

//! Local cache the dashboard falls back to while offline.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::DashboardError;

pub const MAIN_KEY: &str = "main";
pub const SALES_TREND_KEY: &str = "sales_trend";
pub const REVENUE_COGS_KEY: &str = "revenue_cogs";
pub const EDIT_MODE_KEY: &str = "edit_mode_state";
pub const CHART_LAYOUT_KEY: &str = "chart_state";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStore {
    DashboardData,
    ChartData,
}

impl CacheStore {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStore::DashboardData => "dashboard_data",
            CacheStore::ChartData => "chart_data",
        }
    }
}

impl core::fmt::Display for CacheStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value cache split into named stores. Values are kept as JSON.
#[derive(Debug, Default)]
pub struct DashboardCache {
    entries: RwLock<HashMap<(CacheStore, String), JsonValue>>,
}

impl DashboardCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Serialize>(&self, store: CacheStore, key: &str, value: &T) -> Result<(), DashboardError> {
        let json = serde_json::to_value(value)?;
        let mut entries = self.entries.write().map_err(|_| DashboardError::CachePoisoned)?;
        entries.insert((store, key.to_string()), json);
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, store: CacheStore, key: &str) -> Result<Option<T>, DashboardError> {
        let entries = self.entries.read().map_err(|_| DashboardError::CachePoisoned)?;
        match entries.get(&(store, key.to_string())) {
            Some(json) => Ok(Some(serde_json::from_value(json.clone())?)),
            None => Ok(None),
        }
    }

    /// Returns whether the key was present.
    pub fn delete(&self, store: CacheStore, key: &str) -> Result<bool, DashboardError> {
        let mut entries = self.entries.write().map_err(|_| DashboardError::CachePoisoned)?;
        Ok(entries.remove(&(store, key.to_string())).is_some())
    }

    /// Drop every entry of one store.
    pub fn clear(&self, store: CacheStore) -> Result<(), DashboardError> {
        let mut entries = self.entries.write().map_err(|_| DashboardError::CachePoisoned)?;
        entries.retain(|(s, _), _| *s != store);
        Ok(())
    }
}

/// Whether the dashboard layout is being edited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditModeState {
    pub is_edit_mode: bool,
    pub sidebar_visible: bool,
}

impl EditModeState {
    /// Flip edit mode; the sidebar follows it.
    pub fn toggled(self) -> Self {
        let is_edit_mode = !self.is_edit_mode;
        Self {
            is_edit_mode,
            sidebar_visible: is_edit_mode,
        }
    }

    pub fn closed() -> Self {
        Self::default()
    }
}

/// Charts that can be dropped onto the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    RevenueCogs,
    SalesTrend,
}

impl ChartKind {
    /// Identifier carried by the sidebar's drag payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::RevenueCogs => "revenue-cogs-chart",
            ChartKind::SalesTrend => "sales-trend-chart",
        }
    }
}

impl core::str::FromStr for ChartKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "revenue-cogs-chart" => Ok(ChartKind::RevenueCogs),
            "sales-trend-chart" => Ok(ChartKind::SalesTrend),
            other => Err(DashboardError::UnknownChart(other.to_string())),
        }
    }
}

impl core::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which charts sit in the dashboard drop zone. Nothing is placed by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartLayoutState {
    #[serde(default)]
    pub show_revenue_cogs_chart: bool,
    #[serde(default)]
    pub show_sales_trend_chart: bool,
}

impl ChartLayoutState {
    pub fn shows(&self, chart: ChartKind) -> bool {
        match chart {
            ChartKind::RevenueCogs => self.show_revenue_cogs_chart,
            ChartKind::SalesTrend => self.show_sales_trend_chart,
        }
    }

    pub fn with(mut self, chart: ChartKind, shown: bool) -> Self {
        match chart {
            ChartKind::RevenueCogs => self.show_revenue_cogs_chart = shown,
            ChartKind::SalesTrend => self.show_sales_trend_chart = shown,
        }
        self
    }
}

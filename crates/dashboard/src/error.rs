use thiserror::Error;

use saledash_host::HostError;

use crate::cache::CacheStore;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Host(#[from] HostError),

    /// Offline load with nothing cached for the key.
    #[error("no cached {store}/{key} available offline")]
    OfflineCacheMiss { store: CacheStore, key: String },

    #[error("unknown dashboard chart '{0}'")]
    UnknownChart(String),

    #[error("dashboard cache lock poisoned")]
    CachePoisoned,

    #[error("cached value could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

use std::net::SocketAddr;

use thiserror::Error;

use saledash_dashboard::{ConfigError, DashboardConfig};

#[derive(Debug, Error)]
pub enum ApiConfigError {
    #[error(transparent)]
    Dashboard(#[from] ConfigError),

    #[error("invalid SALEDASH_BIND_ADDR {0:?}")]
    BindAddr(String),
}

/// Server settings read from the environment at startup.
#[derive(Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub db_name: String,
    pub jwt_secret: String,
    pub dashboard: DashboardConfig,
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("db_name", &self.db_name)
            .field("dashboard", &self.dashboard)
            .finish_non_exhaustive()
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ApiConfigError> {
        let raw_addr = std::env::var("SALEDASH_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let bind_addr = raw_addr
            .parse()
            .map_err(|_| ApiConfigError::BindAddr(raw_addr.clone()))?;

        let db_name = std::env::var("SALEDASH_DB_NAME").unwrap_or_else(|_| "saledash".to_string());

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        Ok(Self {
            bind_addr,
            db_name,
            jwt_secret,
            dashboard: DashboardConfig::from_env()?,
        })
    }

    /// Defaults with the given secret; binds to an ephemeral local port.
    pub fn for_tests(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            db_name: "saledash".to_string(),
            jwt_secret: jwt_secret.into(),
            dashboard: DashboardConfig::default(),
        }
    }
}

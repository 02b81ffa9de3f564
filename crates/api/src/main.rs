use std::sync::Arc;

use anyhow::Context;

use saledash_api::app::{self, services::AppServices};
use saledash_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    saledash_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    let bind_addr = config.bind_addr;

    let services = Arc::new(AppServices::new(config));
    let refresher = services
        .start_refresher()
        .context("failed to start dashboard refresher")?;
    let app = app::build_app_with(services);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    let served = axum::serve(listener, app).await;
    refresher.shutdown();
    served.context("server error")
}

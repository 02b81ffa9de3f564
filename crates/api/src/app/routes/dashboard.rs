use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use saledash_auth::SessionContext;
use saledash_dashboard::{ChartKind, DashboardError};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::require_user;

pub fn router() -> Router {
    Router::new()
        .route("/kpis", get(kpis))
        .route("/charts/sales_trend", get(sales_trend))
        .route("/charts/revenue_cogs", get(revenue_cogs))
        .route("/charts/layout", get(chart_layout))
        .route("/charts/layout/add", post(add_chart))
        .route("/charts/layout/remove", post(remove_chart))
        .route("/edit_mode", get(edit_mode))
        .route("/edit_mode/toggle", post(toggle_edit_mode))
        .route("/edit_mode/close", post(close_edit_mode))
}

fn respond<T: Serialize>(result: Result<T, DashboardError>) -> axum::response::Response {
    match result {
        Ok(v) => Json(v).into_response(),
        Err(e) => errors::dashboard_error_to_response(e),
    }
}

/// GET /dashboard/kpis?offline=bool
pub async fn kpis(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Query(q): Query<dto::OfflineQuery>,
) -> axum::response::Response {
    respond(services.dashboard.kpis(&ctx, q.offline))
}

pub async fn sales_trend(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Query(q): Query<dto::OfflineQuery>,
) -> axum::response::Response {
    respond(services.dashboard.sales_trend(&ctx, q.offline))
}

pub async fn revenue_cogs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Query(q): Query<dto::OfflineQuery>,
) -> axum::response::Response {
    respond(services.dashboard.revenue_cogs(&ctx, q.offline))
}

pub async fn edit_mode(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> axum::response::Response {
    respond(services.dashboard.edit_mode(&ctx))
}

pub async fn toggle_edit_mode(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> axum::response::Response {
    if let Err(resp) = require_user(&ctx) {
        return resp;
    }
    respond(services.dashboard.toggle_edit_mode(&ctx))
}

pub async fn close_edit_mode(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> axum::response::Response {
    if let Err(resp) = require_user(&ctx) {
        return resp;
    }
    respond(services.dashboard.close_edit_mode(&ctx))
}

pub async fn chart_layout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> axum::response::Response {
    respond(services.dashboard.chart_layout(&ctx))
}

/// POST /dashboard/charts/layout/add
///
/// Body carries the sidebar drag id of the dropped chart.
pub async fn add_chart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<dto::ChartLayoutRequest>,
) -> axum::response::Response {
    if let Err(resp) = require_user(&ctx) {
        return resp;
    }
    respond(
        body.chart
            .parse::<ChartKind>()
            .and_then(|chart| services.dashboard.add_chart(&ctx, chart)),
    )
}

pub async fn remove_chart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<dto::ChartLayoutRequest>,
) -> axum::response::Response {
    if let Err(resp) = require_user(&ctx) {
        return resp;
    }
    respond(
        body.chart
            .parse::<ChartKind>()
            .and_then(|chart| services.dashboard.remove_chart(&ctx, chart)),
    )
}

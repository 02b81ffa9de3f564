use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use saledash_auth::SessionContext;
use saledash_dashboard::ModuleManifest;

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /web/session/get_session_info
pub async fn session_info(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
) -> axum::response::Response {
    match services.host.session_info(&ctx) {
        Ok(info) => Json(info).into_response(),
        Err(e) => errors::host_error_to_response(e),
    }
}

pub async fn manifest() -> impl IntoResponse {
    Json(ModuleManifest::sale_dashboard())
}

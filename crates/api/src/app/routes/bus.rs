use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    routing::get,
    Router,
};

use crate::app::dto;
use crate::app::services::{self, AppServices};

pub fn router() -> Router {
    Router::new().route("/stream", get(stream))
}

/// GET /bus/stream?channels=a,b
///
/// Server-sent events, one per notification; the event name is the
/// message type and the data is the JSON payload.
pub async fn stream(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::StreamQuery>,
) -> axum::response::Response {
    let channels = query.channel_list(&services.config.dashboard.channel);
    tracing::debug!(?channels, "bus stream opened");
    services::notification_sse_stream(services, channels).into_response()
}

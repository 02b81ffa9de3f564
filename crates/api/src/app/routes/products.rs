use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use saledash_auth::SessionContext;
use saledash_products::ProductId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::require_user;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product))
        .route("/:id", get(get_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    if let Err(resp) = require_user(&ctx) {
        return resp;
    }

    match services
        .host
        .register_product(&body.name, &body.category, body.standard_price)
    {
        Ok(p) => (StatusCode::CREATED, Json(dto::ProductView::from(&p))).into_response(),
        Err(e) => errors::host_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id = match errors::parse_id(&id, "product") {
        Ok(v) => ProductId::new(v),
        Err(resp) => return resp,
    };

    match services.host.product(product_id) {
        Some(p) => Json(dto::ProductView::from(&p)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
    }
}

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use saledash_auth::SessionContext;
use saledash_host::{HostError, NewPicking};
use saledash_inventory::{PickingId, StockPicking};
use saledash_products::ProductId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::require_user;

pub fn router() -> Router {
    Router::new().nest("/pickings", pickings_router())
}

fn pickings_router() -> Router {
    Router::new()
        .route("/", post(create_picking))
        .route("/:id", get(get_picking))
        .route("/:id/moves", post(add_move))
        .route("/:id/moves/:move_no/quantity", post(set_move_quantity))
        .route("/:id/todo", post(mark_todo))
        .route("/:id/validate", post(validate_picking))
        .route("/:id/cancel", post(cancel_picking))
}

fn picking_response(status: StatusCode, result: Result<StockPicking, HostError>) -> axum::response::Response {
    match result {
        Ok(picking) => (status, Json(dto::PickingView::from(&picking))).into_response(),
        Err(e) => errors::host_error_to_response(e),
    }
}

pub async fn create_picking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<dto::CreatePickingRequest>,
) -> axum::response::Response {
    if let Err(resp) = require_user(&ctx) {
        return resp;
    }
    let id = match body.id.map(|raw| errors::record_id(raw, "picking")).transpose() {
        Ok(v) => v.map(PickingId::new),
        Err(resp) => return resp,
    };

    let new = NewPicking {
        id,
        picking_type: body.picking_type,
        origin: body.origin,
    };
    picking_response(StatusCode::CREATED, services.host.create_picking(&ctx, new))
}

pub async fn get_picking(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let picking_id = match errors::parse_id(&id, "picking") {
        Ok(v) => PickingId::new(v),
        Err(resp) => return resp,
    };

    match services.host.picking(picking_id) {
        Some(p) => Json(dto::PickingView::from(&p)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "picking not found"),
    }
}

pub async fn add_move(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::AddMoveRequest>,
) -> axum::response::Response {
    if let Err(resp) = require_user(&ctx) {
        return resp;
    }
    let picking_id = match errors::parse_id(&id, "picking") {
        Ok(v) => PickingId::new(v),
        Err(resp) => return resp,
    };
    let product_id = match errors::record_id(body.product_id, "product") {
        Ok(v) => ProductId::new(v),
        Err(resp) => return resp,
    };

    picking_response(
        StatusCode::OK,
        services.host.add_move(&ctx, picking_id, product_id, body.product_uom_qty),
    )
}

pub async fn set_move_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path((id, move_no)): Path<(String, u32)>,
    Json(body): Json<dto::SetMoveQuantityRequest>,
) -> axum::response::Response {
    if let Err(resp) = require_user(&ctx) {
        return resp;
    }
    let picking_id = match errors::parse_id(&id, "picking") {
        Ok(v) => PickingId::new(v),
        Err(resp) => return resp,
    };

    picking_response(
        StatusCode::OK,
        services.host.set_move_quantity(&ctx, picking_id, move_no, body.quantity),
    )
}

pub async fn mark_todo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_user(&ctx) {
        return resp;
    }
    let picking_id = match errors::parse_id(&id, "picking") {
        Ok(v) => PickingId::new(v),
        Err(resp) => return resp,
    };

    picking_response(StatusCode::OK, services.host.mark_picking_todo(&ctx, picking_id))
}

/// POST /stock/pickings/:id/validate
///
/// Publishes the sale update notification once the picking is done.
pub async fn validate_picking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_user(&ctx) {
        return resp;
    }
    let picking_id = match errors::parse_id(&id, "picking") {
        Ok(v) => PickingId::new(v),
        Err(resp) => return resp,
    };

    picking_response(StatusCode::OK, services.host.validate_picking(&ctx, picking_id))
}

pub async fn cancel_picking(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_user(&ctx) {
        return resp;
    }
    let picking_id = match errors::parse_id(&id, "picking") {
        Ok(v) => PickingId::new(v),
        Err(resp) => return resp,
    };

    picking_response(StatusCode::OK, services.host.cancel_picking(&ctx, picking_id))
}

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use saledash_auth::SessionContext;
use saledash_core::UserId;
use saledash_host::{HostError, NewSaleOrder, SaleOrderFilter};
use saledash_products::ProductId;
use saledash_sales::{SaleOrder, SaleOrderId};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::require_user;

pub fn router() -> Router {
    Router::new().nest("/orders", orders_router())
}

fn orders_router() -> Router {
    Router::new()
        .route("/", post(create_sale_order).get(list_sale_orders))
        .route("/:id", get(get_sale_order))
        .route("/:id/lines", post(add_order_line))
        .route("/:id/confirm", post(confirm_sale_order))
        .route("/:id/lock", post(lock_sale_order))
        .route("/:id/cancel", post(cancel_sale_order))
}

fn order_response(status: StatusCode, result: Result<SaleOrder, HostError>) -> axum::response::Response {
    match result {
        Ok(order) => (status, Json(dto::SaleOrderView::from(&order))).into_response(),
        Err(e) => errors::host_error_to_response(e),
    }
}

pub async fn create_sale_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    body: Option<Json<dto::CreateSaleOrderRequest>>,
) -> axum::response::Response {
    if let Err(resp) = require_user(&ctx) {
        return resp;
    }
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let id = match body.id.map(|raw| errors::record_id(raw, "order")).transpose() {
        Ok(v) => v.map(SaleOrderId::new),
        Err(resp) => return resp,
    };

    let salesperson = match body.salesperson.map(|raw| errors::user_id(raw, "salesperson")).transpose() {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let new = NewSaleOrder {
        id,
        salesperson,
        date_order: None,
    };

    order_response(StatusCode::CREATED, services.host.create_sale_order(&ctx, new))
}

pub async fn list_sale_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListSaleOrdersQuery>,
) -> axum::response::Response {
    let states = match query.state.as_deref().map(dto::parse_states).transpose() {
        Ok(v) => v.unwrap_or_default(),
        Err(msg) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
    };

    let filter = SaleOrderFilter {
        states,
        salesperson: query.salesperson.map(UserId::new),
        date_from: None,
        limit: Some(
            query
                .limit
                .unwrap_or(services.config.dashboard.search_limit)
                .min(services.config.dashboard.search_limit),
        ),
    };

    let orders: Vec<dto::SaleOrderView> = services
        .host
        .search_sale_orders(&filter)
        .iter()
        .map(dto::SaleOrderView::from)
        .collect();
    Json(orders).into_response()
}

pub async fn get_sale_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id = match errors::parse_id(&id, "order") {
        Ok(v) => SaleOrderId::new(v),
        Err(resp) => return resp,
    };

    match services.host.sale_order(order_id) {
        Some(order) => Json(dto::SaleOrderView::from(&order)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "sale order not found"),
    }
}

pub async fn add_order_line(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::AddOrderLineRequest>,
) -> axum::response::Response {
    if let Err(resp) = require_user(&ctx) {
        return resp;
    }
    let order_id = match errors::parse_id(&id, "order") {
        Ok(v) => SaleOrderId::new(v),
        Err(resp) => return resp,
    };
    let product_id = match errors::record_id(body.product_id, "product") {
        Ok(v) => ProductId::new(v),
        Err(resp) => return resp,
    };

    order_response(
        StatusCode::OK,
        services
            .host
            .add_order_line(&ctx, order_id, product_id, body.quantity, body.price_unit),
    )
}

/// POST /sale/orders/:id/confirm
///
/// Publishes the sale update notification once the order is confirmed.
pub async fn confirm_sale_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_user(&ctx) {
        return resp;
    }
    let order_id = match errors::parse_id(&id, "order") {
        Ok(v) => SaleOrderId::new(v),
        Err(resp) => return resp,
    };

    order_response(StatusCode::OK, services.host.confirm_sale_order(&ctx, order_id))
}

pub async fn lock_sale_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_user(&ctx) {
        return resp;
    }
    let order_id = match errors::parse_id(&id, "order") {
        Ok(v) => SaleOrderId::new(v),
        Err(resp) => return resp,
    };

    order_response(StatusCode::OK, services.host.lock_sale_order(&ctx, order_id))
}

pub async fn cancel_sale_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_user(&ctx) {
        return resp;
    }
    let order_id = match errors::parse_id(&id, "order") {
        Ok(v) => SaleOrderId::new(v),
        Err(resp) => return resp,
    };

    order_response(StatusCode::OK, services.host.cancel_sale_order(&ctx, order_id))
}

use axum::{routing::get, Router};

pub mod bus;
pub mod dashboard;
pub mod products;
pub mod sales;
pub mod stock;
pub mod system;

/// Router for every session-aware endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/web/session/get_session_info", get(system::session_info))
        .route("/module/manifest", get(system::manifest))
        .nest("/sale", sales::router())
        .nest("/stock", stock::router())
        .nest("/products", products::router())
        .nest("/bus", bus::router())
        .nest("/dashboard", dashboard::router())
}

//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: host, notification bus and dashboard wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router over fresh services.
pub fn build_app(config: ApiConfig) -> Router {
    build_app_with(Arc::new(services::AppServices::new(config)))
}

/// Build the router over existing services (used by `main.rs` to keep a
/// handle on the refresher).
pub fn build_app_with(services: Arc<services::AppServices>) -> Router {
    let jwt = Arc::new(saledash_auth::Hs256JwtValidator::new(
        services.config.jwt_secret.as_bytes(),
    ));
    let auth_state = middleware::AuthState {
        jwt,
        public_user: services.config.dashboard.public_user,
    };

    let session_routes = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::session_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(session_routes)
        .layer(ServiceBuilder::new())
}

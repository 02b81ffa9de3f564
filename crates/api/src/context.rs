use axum::response::Response;
use axum::http::StatusCode;

use saledash_auth::SessionContext;

use crate::app::errors::json_error;

/// Reject public sessions for endpoints that change data.
pub fn require_user(ctx: &SessionContext) -> Result<(), Response> {
    if ctx.is_public() {
        return Err(json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "sign in to perform this action",
        ));
    }
    Ok(())
}

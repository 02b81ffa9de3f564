use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use saledash_auth::{JwtValidator, SessionContext};
use saledash_core::UserId;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub public_user: UserId,
}

/// Attach a [`SessionContext`] to every request.
///
/// No `Authorization` header yields the public session. A header that is
/// not a valid bearer token is rejected with 401.
pub async fn session_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let ctx = match extract_bearer(req.headers())? {
        None => SessionContext::public(state.public_user),
        Some(token) => {
            let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                StatusCode::UNAUTHORIZED
            })?;
            SessionContext::from_claims(&claims)
        }
    };

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, StatusCode> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(Some(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_header_is_public() {
        assert_eq!(extract_bearer(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        for raw in ["Basic abc", "Bearer ", "token"] {
            let mut headers = HeaderMap::new();
            headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static(raw));
            assert_eq!(extract_bearer(&headers), Err(StatusCode::UNAUTHORIZED), "{raw}");
        }
    }

    #[test]
    fn bearer_token_is_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer  abc.def "),
        );
        assert_eq!(extract_bearer(&headers), Ok(Some("abc.def")));
    }
}

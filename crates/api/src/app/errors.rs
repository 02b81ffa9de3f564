use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use saledash_core::{DomainError, RecordId, UserId};
use saledash_dashboard::DashboardError;
use saledash_host::{HostError, StoreError};

pub fn host_error_to_response(err: HostError) -> axum::response::Response {
    match err {
        HostError::Domain(e) => domain_error_to_response(e),
        HostError::RecordNotFound { model, id } => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{model} {id} not found"))
        }
        HostError::Store(e @ StoreError::SequenceExhausted) => {
            json_error(StatusCode::CONFLICT, "sequence_exhausted", e.to_string())
        }
        HostError::Store(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
        // The transition itself went through; only the follow-up failed.
        HostError::Hook(e) => json_error(StatusCode::BAD_GATEWAY, "hook_error", format!("{e:#}")),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn dashboard_error_to_response(err: DashboardError) -> axum::response::Response {
    match err {
        DashboardError::Host(e) => host_error_to_response(e),
        e @ DashboardError::OfflineCacheMiss { .. } => {
            json_error(StatusCode::NOT_FOUND, "offline_cache_miss", e.to_string())
        }
        e @ DashboardError::UnknownChart(_) => json_error(StatusCode::BAD_REQUEST, "unknown_chart", e.to_string()),
        e => json_error(StatusCode::INTERNAL_SERVER_ERROR, "cache_error", e.to_string()),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a positive record id from a path segment.
pub fn parse_id(raw: &str, what: &str) -> Result<RecordId, axum::response::Response> {
    raw.parse::<RecordId>()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}

/// Validate a user id taken from a request body.
pub fn user_id(raw: u64, what: &str) -> Result<UserId, axum::response::Response> {
    record_id(raw, what).map(|id| UserId::new(id.get()))
}

/// Validate a record id taken from a request body.
pub fn record_id(raw: u64, what: &str) -> Result<RecordId, axum::response::Response> {
    if raw == 0 {
        return Err(json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")));
    }
    Ok(RecordId::new(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ids_in_bodies_are_rejected() {
        let resp = user_id(0, "salesperson").unwrap_err();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(user_id(7, "salesperson").ok(), Some(UserId::new(7)));
        assert!(record_id(0, "order").is_err());
    }

    #[test]
    fn exhausted_sequence_maps_to_conflict() {
        let resp = host_error_to_response(HostError::Store(StoreError::SequenceExhausted));
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = host_error_to_response(HostError::Store(StoreError::Poisoned));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unknown_chart_is_a_bad_request() {
        let resp = dashboard_error_to_response(DashboardError::UnknownChart("pie-chart".into()));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

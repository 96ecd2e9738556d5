use std::collections::BTreeMap;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use tradeerp_core::DomainError;
use tradeerp_infra::ServiceError;

/// Business codes reported as 409: the request clashes with existing state
/// rather than breaking a transition rule.
const CONFLICT_CODES: &[&str] = &[
    "DUPLICATE_REGISTRATION_NUMBER",
    "DUPLICATE_USERNAME",
    "PO_ALREADY_EXISTS",
    "AP_ALREADY_EXISTS",
    "PROJECT_ALREADY_AWARDED",
    "RFQ_DUPLICATE_VENDOR",
    "PURCHASE_REQUEST_HAS_OPEN_ORDER",
];

pub fn domain_error_to_response(err: &DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg.clone())
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg.clone()),
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg.clone()),
        DomainError::BusinessRule { code, message } => {
            let status = if CONFLICT_CODES.contains(code) {
                StatusCode::CONFLICT
            } else {
                StatusCode::UNPROCESSABLE_ENTITY
            };
            json_error(status, code, message.clone())
        }
    }
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match &err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Publish(e) => {
            tracing::warn!(
                event_type = e.event_type,
                handler = e.handler,
                error = %e.source,
                "event handler rejected the write"
            );
            domain_error_to_response(&e.source)
        }
        ServiceError::Lock(e) => {
            tracing::error!(error = %e, "project lock unavailable");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "lock_error", e.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &str,
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

/// 400 with per-field messages.
pub fn field_errors(fields: BTreeMap<String, String>) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "message": "request has invalid fields",
            "fields": fields,
        })),
    )
        .into_response()
}

pub fn json_rejection(err: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", err.body_text())
}

pub fn query_rejection(err: QueryRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_query", err.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_codes_map_to_409_or_422() {
        let dup = DomainError::business("DUPLICATE_REGISTRATION_NUMBER", "taken");
        assert_eq!(domain_error_to_response(&dup).status(), StatusCode::CONFLICT);

        let transition = DomainError::business("PO_INVALID_STATUS", "draft");
        assert_eq!(
            domain_error_to_response(&transition).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn validation_and_missing_records() {
        assert_eq!(
            domain_error_to_response(&DomainError::validation("name")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            domain_error_to_response(&DomainError::not_found("project x")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            domain_error_to_response(&DomainError::conflict("stale")).status(),
            StatusCode::CONFLICT
        );
    }
}

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::json;

use couponapi_infra::CouponServiceError;

use super::dto::FieldErrors;

pub fn service_error_to_response(err: CouponServiceError) -> Response {
    match err {
        CouponServiceError::NotFound(_) => json_error(StatusCode::NOT_FOUND, err.to_string()),
        CouponServiceError::Rule(_) => json_error(StatusCode::BAD_REQUEST, err.to_string()),
        CouponServiceError::DuplicateCode(_) | CouponServiceError::Concurrency(_) => {
            json_error(StatusCode::CONFLICT, err.to_string())
        }
        CouponServiceError::Repository(e) => {
            tracing::error!(error = %e, "coupon storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

pub fn validation_error(errors: FieldErrors) -> Response {
    error_body(StatusCode::BAD_REQUEST, "Validation failed", Some(errors))
}

pub fn json_rejection_to_response(rejection: JsonRejection) -> Response {
    json_error(StatusCode::BAD_REQUEST, rejection.body_text())
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    error_body(status, message, None)
}

/// `{timestamp, status, error, message, errors?}`
fn error_body(status: StatusCode, message: impl Into<String>, errors: Option<FieldErrors>) -> Response {
    let mut body = json!({
        "timestamp": Utc::now(),
        "status": status.as_u16(),
        "error": status.canonical_reason().unwrap_or("Error"),
        "message": message.into(),
    });
    if let Some(errors) = errors {
        body["errors"] = json!(errors);
    }
    (status, axum::Json(body)).into_response()
}

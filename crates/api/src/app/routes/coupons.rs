use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
};
use chrono::Utc;

use crate::app::dto::{CouponResponse, CreateCouponRequest};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_coupon))
        .route("/:id", delete(delete_coupon))
}

pub async fn create_coupon(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CreateCouponRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let input = match body.validate(Utc::now()) {
        Ok(input) => input,
        Err(field_errors) => return errors::validation_error(field_errors),
    };

    match services.coupons.create(input).await {
        Ok(view) => (StatusCode::CREATED, Json(CouponResponse::from(view))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_coupon(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.coupons.delete(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

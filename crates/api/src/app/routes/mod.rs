use axum::Router;

pub mod coupons;
pub mod system;

/// Router for all API endpoints.
pub fn router() -> Router {
    Router::new().nest("/api/coupons", coupons::router())
}

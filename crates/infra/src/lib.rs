//! Infrastructure layer: coupon storage, orchestration service, configuration.

pub mod config;
pub mod coupon_service;
pub mod repository;

pub use config::{AppConfig, ConfigError, StorageConfig};
pub use coupon_service::{CouponService, CouponServiceError, CouponView, CreateCoupon};
pub use repository::{
    CouponRepository, InMemoryCouponRepository, PostgresCouponRepository, RepositoryError,
};

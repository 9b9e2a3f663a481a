//! Coupon storage boundary.
//!
//! Defines the storage collaborator the coupon service depends on, plus an
//! in-memory implementation (tests/dev) and a Postgres implementation.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCouponRepository;
pub use postgres::PostgresCouponRepository;
pub use r#trait::{CouponRepository, RepositoryError};

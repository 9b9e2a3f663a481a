//! Coupons domain module.
//!
//! This crate contains the business rules for discount coupons, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).
//!
//! A coupon only comes into existence through [`NewCoupon::new`], which normalizes
//! and validates its input. Storage turns a [`NewCoupon`] into a persisted
//! [`Coupon`] by assigning it an id; from then on the only permitted transition is
//! the soft delete performed by [`Coupon::mark_deleted`].

pub mod code;
pub mod coupon;
pub mod error;

pub use code::CouponCode;
pub use coupon::{Coupon, CouponSnapshot, CouponStatus, MIN_DISCOUNT_VALUE, NewCoupon};
pub use error::CouponError;

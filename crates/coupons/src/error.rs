//! Business-rule violations raised by the coupon entity.

use thiserror::Error;

/// Business-rule violation.
///
/// Each variant is terminal for the request that raised it. The messages are
/// part of the public API: the transport layer returns them verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CouponError {
    /// Normalized code is not exactly six characters long.
    #[error("Invalid coupon code. It must be exactly 6 characters.")]
    InvalidCodeLength,

    /// Expiration date is not strictly after the construction time.
    #[error("Expiration date cannot be in the past.")]
    ExpirationInPast,

    /// Discount value is below the minimum.
    #[error("Minimum discount value allowed is 0.5.")]
    DiscountTooLow,

    /// Retirement was requested for a coupon that is already retired.
    #[error("Coupon is already deleted.")]
    AlreadyDeleted,

    /// A stored record does not satisfy the entity invariants.
    #[error("inconsistent coupon state: {0}")]
    InconsistentState(String),
}

impl CouponError {
    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Self::InconsistentState(msg.into())
    }

    /// True for violations a caller can fix by changing its request.
    pub fn is_business_rule(&self) -> bool {
        !matches!(self, CouponError::InconsistentState(_))
    }
}

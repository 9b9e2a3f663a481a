use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use couponapi_core::CouponId;
use couponapi_coupons::{Coupon, NewCoupon};

/// Coupon storage operation error.
///
/// These are **infrastructure errors** as opposed to the business-rule
/// violations in `CouponError`. Two of them carry domain meaning and are
/// classified by the service: a duplicate code and a lost concurrent update.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Another coupon already uses this (normalized) code.
    #[error("duplicate coupon code: {0}")]
    DuplicateCode(String),

    /// Conditional update failed: the stored version moved on.
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    /// Update target does not exist.
    #[error("coupon {0} does not exist")]
    NotFound(CouponId),

    /// A stored record could not be turned back into a valid coupon.
    #[error("corrupt coupon record: {0}")]
    Corrupt(String),

    /// Anything else the backend reported (connection, pool, SQL errors).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Storage collaborator for coupons.
///
/// `insert` and `update` together form a save operation: `insert` assigns the
/// id of a new coupon, `update` rewrites an existing one and never inserts.
///
/// ## Implementation Requirements
///
/// Implementations must:
/// - enforce uniqueness of `code` across all coupons (including retired ones)
/// - assign a fresh `CouponId` on insert and never reassign it
/// - apply `update` only when the stored version equals `expected_version`,
///   atomically with the write
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Persist a new coupon, assigning its id (version 1).
    async fn insert(&self, coupon: NewCoupon) -> Result<Coupon, RepositoryError>;

    /// Persist a mutated coupon if the stored version matches `expected_version`.
    async fn update(
        &self,
        coupon: &Coupon,
        expected_version: u64,
    ) -> Result<(), RepositoryError>;

    /// Load a coupon by id; `Ok(None)` when absent.
    async fn find_by_id(&self, id: CouponId) -> Result<Option<Coupon>, RepositoryError>;
}

#[async_trait]
impl<S> CouponRepository for Arc<S>
where
    S: CouponRepository + ?Sized,
{
    async fn insert(&self, coupon: NewCoupon) -> Result<Coupon, RepositoryError> {
        (**self).insert(coupon).await
    }

    async fn update(
        &self,
        coupon: &Coupon,
        expected_version: u64,
    ) -> Result<(), RepositoryError> {
        (**self).update(coupon, expected_version).await
    }

    async fn find_by_id(&self, id: CouponId) -> Result<Option<Coupon>, RepositoryError> {
        (**self).find_by_id(id).await
    }
}

//! Coupon orchestration (application-level service).
//!
//! Turns create/delete requests into validated state changes:
//!
//! ```text
//! create: request -> NewCoupon::new (validates) -> repository.insert -> CouponView
//! delete: id -> repository.find_by_id -> Coupon::mark_deleted -> repository.update
//! ```
//!
//! The service adds no business rules of its own. Entity state is only changed
//! through the entity's methods, and nothing is written unless the entity
//! accepted the change first.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;

use couponapi_core::{AggregateRoot, CouponId};
use couponapi_coupons::{Coupon, CouponError, NewCoupon};

use crate::repository::{CouponRepository, RepositoryError};

/// Input for [`CouponService::create`].
///
/// Shape (presence, types) is checked by the transport layer before this is
/// built; business rules are left to the entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCoupon {
    pub code: String,
    pub description: String,
    pub discount_value: Decimal,
    pub expiration_date: DateTime<Utc>,
    pub published: Option<bool>,
}

/// Read view of a persisted coupon.
///
/// Status and retirement timestamp are internal and not part of the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponView {
    pub id: CouponId,
    pub code: String,
    pub description: String,
    pub discount_value: Decimal,
    pub expiration_date: DateTime<Utc>,
    pub published: bool,
}

impl From<&Coupon> for CouponView {
    fn from(coupon: &Coupon) -> Self {
        Self {
            id: coupon.id_typed(),
            code: coupon.code().as_str().to_string(),
            description: coupon.description().to_string(),
            discount_value: coupon.discount_value(),
            expiration_date: coupon.expiration_date(),
            published: coupon.published(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CouponServiceError {
    /// Business-rule violation reported by the entity, unchanged.
    #[error(transparent)]
    Rule(#[from] CouponError),

    /// No coupon with this id.
    #[error("Coupon not found with id: {0}")]
    NotFound(String),

    /// The normalized code is already taken.
    #[error("Coupon code already exists: {0}")]
    DuplicateCode(String),

    /// The coupon changed between load and write (e.g. concurrent delete).
    #[error("Coupon was modified concurrently: {0}")]
    Concurrency(String),

    /// Storage failure, not classified further.
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CouponServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::DuplicateCode(code) => CouponServiceError::DuplicateCode(code),
            RepositoryError::Concurrency(msg) => CouponServiceError::Concurrency(msg),
            RepositoryError::NotFound(id) => CouponServiceError::NotFound(id.to_string()),
            other => CouponServiceError::Repository(other),
        }
    }
}

/// Orchestrates coupon creation and retirement over a storage collaborator.
///
/// Holds no mutable state of its own; every call works on its own entity
/// instance, so one service can be shared across concurrent requests.
#[derive(Debug, Clone)]
pub struct CouponService<R> {
    repository: R,
}

impl<R> CouponService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

impl<R> CouponService<R>
where
    R: CouponRepository,
{
    /// Validate and persist a new coupon, returning its read view.
    #[instrument(skip(self, request), fields(code = %request.code), err)]
    pub async fn create(&self, request: CreateCoupon) -> Result<CouponView, CouponServiceError> {
        let coupon = NewCoupon::new(
            &request.code,
            request.description,
            request.discount_value,
            request.expiration_date,
            request.published,
        )?;

        let saved = self.repository.insert(coupon).await?;

        tracing::info!(
            coupon_id = %saved.id(),
            code = %saved.code(),
            status = %saved.status(),
            "coupon created"
        );
        Ok(CouponView::from(&saved))
    }

    /// Retire (soft delete) a coupon.
    ///
    /// An id that is not a valid coupon id cannot exist and is reported as not
    /// found. The write is conditional on the version that was loaded, so of two
    /// concurrent deletions at most one succeeds.
    #[instrument(skip(self), err)]
    pub async fn delete(&self, id: &str) -> Result<(), CouponServiceError> {
        let coupon_id: CouponId = id
            .parse()
            .map_err(|_| CouponServiceError::NotFound(id.to_string()))?;

        let mut coupon = self
            .repository
            .find_by_id(coupon_id)
            .await?
            .ok_or_else(|| CouponServiceError::NotFound(id.to_string()))?;

        let expected = coupon.version();
        coupon.mark_deleted()?;

        self.repository.update(&coupon, expected).await?;

        tracing::info!(coupon_id = %coupon.id(), "coupon deleted");
        Ok(())
    }
}

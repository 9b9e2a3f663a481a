//! Coupon entity: validated construction and the soft-delete state machine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use couponapi_core::{AggregateRoot, CouponId};

use crate::code::CouponCode;
use crate::error::CouponError;

/// Smallest discount value a coupon may carry (0.5).
pub const MIN_DISCOUNT_VALUE: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Coupon status lifecycle.
///
/// `Active` and `Inactive` are initial states chosen once at construction from
/// the `published` flag. `Deleted` is terminal and reachable from either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CouponStatus {
    Active,
    Inactive,
    Deleted,
}

impl CouponStatus {
    fn initial(published: bool) -> Self {
        if published {
            CouponStatus::Active
        } else {
            CouponStatus::Inactive
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CouponStatus::Active => "ACTIVE",
            CouponStatus::Inactive => "INACTIVE",
            CouponStatus::Deleted => "DELETED",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == CouponStatus::Deleted
    }

    /// The only transition after construction: retire the coupon.
    fn retire(self) -> Result<Self, CouponError> {
        match self {
            CouponStatus::Active | CouponStatus::Inactive => Ok(CouponStatus::Deleted),
            CouponStatus::Deleted => Err(CouponError::AlreadyDeleted),
        }
    }
}

impl core::fmt::Display for CouponStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for CouponStatus {
    type Err = CouponError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(CouponStatus::Active),
            "INACTIVE" => Ok(CouponStatus::Inactive),
            "DELETED" => Ok(CouponStatus::Deleted),
            other => Err(CouponError::inconsistent(format!("unknown status '{other}'"))),
        }
    }
}

/// A validated coupon that has not been persisted yet (no id, never deleted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoupon {
    code: CouponCode,
    description: String,
    discount_value: Decimal,
    expiration_date: DateTime<Utc>,
    published: bool,
    status: CouponStatus,
}

impl NewCoupon {
    /// Build a coupon, validating against the current time.
    pub fn new(
        code: &str,
        description: impl Into<String>,
        discount_value: Decimal,
        expiration_date: DateTime<Utc>,
        published: Option<bool>,
    ) -> Result<Self, CouponError> {
        Self::new_at(
            code,
            description,
            discount_value,
            expiration_date,
            published,
            Utc::now(),
        )
    }

    /// Build a coupon, validating against an explicit `now`.
    ///
    /// Checks run in order (code length, expiration, discount) and the first
    /// failure aborts construction.
    pub fn new_at(
        code: &str,
        description: impl Into<String>,
        discount_value: Decimal,
        expiration_date: DateTime<Utc>,
        published: Option<bool>,
        now: DateTime<Utc>,
    ) -> Result<Self, CouponError> {
        let code = CouponCode::parse(code)?;

        if expiration_date <= now {
            return Err(CouponError::ExpirationInPast);
        }

        if discount_value < MIN_DISCOUNT_VALUE {
            return Err(CouponError::DiscountTooLow);
        }

        let published = published.unwrap_or(false);

        Ok(Self {
            code,
            description: description.into(),
            discount_value,
            expiration_date,
            published,
            status: CouponStatus::initial(published),
        })
    }

    pub fn code(&self) -> &CouponCode {
        &self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn discount_value(&self) -> Decimal {
        self.discount_value
    }

    pub fn expiration_date(&self) -> DateTime<Utc> {
        self.expiration_date
    }

    pub fn published(&self) -> bool {
        self.published
    }

    pub fn status(&self) -> CouponStatus {
        self.status
    }

    /// Attach the storage-assigned id. Only storage should call this.
    pub fn into_persisted(self, id: CouponId) -> Coupon {
        Coupon {
            id,
            code: self.code,
            description: self.description,
            discount_value: self.discount_value,
            expiration_date: self.expiration_date,
            published: self.published,
            status: self.status,
            deleted_at: None,
            version: 1,
        }
    }
}

/// Raw stored fields of a coupon, as read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponSnapshot {
    pub id: CouponId,
    pub code: String,
    pub description: String,
    pub discount_value: Decimal,
    pub expiration_date: DateTime<Utc>,
    pub published: bool,
    pub status: CouponStatus,
    pub deleted_at: Option<DateTime<Utc>>,
    pub version: u64,
}

/// Aggregate root: a persisted coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    id: CouponId,
    code: CouponCode,
    description: String,
    discount_value: Decimal,
    expiration_date: DateTime<Utc>,
    published: bool,
    status: CouponStatus,
    deleted_at: Option<DateTime<Utc>>,
    version: u64,
}

impl Coupon {
    /// Rebuild a coupon from storage.
    ///
    /// Re-checks the structural invariants (code length, minimum discount,
    /// `Deleted` iff `deleted_at` is set). The expiration date is not re-checked:
    /// a stored coupon may legitimately have expired since it was created.
    pub fn rehydrate(snapshot: CouponSnapshot) -> Result<Self, CouponError> {
        let code = CouponCode::parse(&snapshot.code)
            .map_err(|_| CouponError::inconsistent(format!("stored code '{}'", snapshot.code)))?;

        if code.as_str() != snapshot.code {
            return Err(CouponError::inconsistent(format!(
                "stored code '{}' is not normalized",
                snapshot.code
            )));
        }

        if snapshot.discount_value < MIN_DISCOUNT_VALUE {
            return Err(CouponError::inconsistent(format!(
                "stored discount {} below minimum",
                snapshot.discount_value
            )));
        }

        if snapshot.status.is_terminal() != snapshot.deleted_at.is_some() {
            return Err(CouponError::inconsistent(format!(
                "status {} with deleted_at {:?}",
                snapshot.status, snapshot.deleted_at
            )));
        }

        if snapshot.version == 0 {
            return Err(CouponError::inconsistent("version 0 for a persisted coupon"));
        }

        Ok(Self {
            id: snapshot.id,
            code,
            description: snapshot.description,
            discount_value: snapshot.discount_value,
            expiration_date: snapshot.expiration_date,
            published: snapshot.published,
            status: snapshot.status,
            deleted_at: snapshot.deleted_at,
            version: snapshot.version,
        })
    }

    pub fn snapshot(&self) -> CouponSnapshot {
        CouponSnapshot {
            id: self.id,
            code: self.code.as_str().to_string(),
            description: self.description.clone(),
            discount_value: self.discount_value,
            expiration_date: self.expiration_date,
            published: self.published,
            status: self.status,
            deleted_at: self.deleted_at,
            version: self.version,
        }
    }

    pub fn id_typed(&self) -> CouponId {
        self.id
    }

    pub fn code(&self) -> &CouponCode {
        &self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn discount_value(&self) -> Decimal {
        self.discount_value
    }

    pub fn expiration_date(&self) -> DateTime<Utc> {
        self.expiration_date
    }

    pub fn published(&self) -> bool {
        self.published
    }

    pub fn status(&self) -> CouponStatus {
        self.status
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn is_deleted(&self) -> bool {
        self.status.is_terminal()
    }

    /// Retire the coupon (soft delete) as of the current time.
    pub fn mark_deleted(&mut self) -> Result<(), CouponError> {
        self.mark_deleted_at(Utc::now())
    }

    /// Retire the coupon as of `now`.
    ///
    /// Fails with `AlreadyDeleted` on a retired coupon and leaves it untouched.
    /// On success status, `deleted_at` and version change together.
    pub fn mark_deleted_at(&mut self, now: DateTime<Utc>) -> Result<(), CouponError> {
        let next = self.status.retire()?;
        self.status = next;
        self.deleted_at = Some(now);
        self.version += 1;
        Ok(())
    }
}

impl AggregateRoot for Coupon {
    type Id = CouponId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

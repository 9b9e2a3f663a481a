//! Postgres-backed coupon store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError | Scenario |
//! |------------|----------------------|-----------------|----------|
//! | Database (unique violation on `code`) | `23505` | `DuplicateCode` | Insert with a code already in use |
//! | Database (unique violation, other) | `23505` | `Backend` | Id collision (should not occur with UUIDv7) |
//! | Database (other) | Any other | `Backend` | Constraint/SQL errors |
//! | PoolClosed / Io / Tls / Other | N/A | `Backend` | Connection failures |
//!
//! A conditional `UPDATE` that touches zero rows maps to `Concurrency` when the
//! row still exists and to `NotFound` when it does not.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use std::sync::Arc;
use tracing::{Span, instrument};

use async_trait::async_trait;

use couponapi_core::{AggregateRoot, CouponId};
use couponapi_coupons::{Coupon, CouponSnapshot, CouponStatus, NewCoupon};

use super::r#trait::{CouponRepository, RepositoryError};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS coupons (
    id              UUID PRIMARY KEY,
    code            VARCHAR(6) NOT NULL,
    description     TEXT NOT NULL,
    discount_value  NUMERIC NOT NULL CHECK (discount_value >= 0.5),
    expiration_date TIMESTAMPTZ NOT NULL,
    status          TEXT NOT NULL CHECK (status IN ('ACTIVE', 'INACTIVE', 'DELETED')),
    published       BOOLEAN NOT NULL,
    deleted_at      TIMESTAMPTZ NULL,
    version         BIGINT NOT NULL CHECK (version > 0),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT coupons_code_key UNIQUE (code),
    CONSTRAINT coupons_deleted_consistency
        CHECK ((status = 'DELETED') = (deleted_at IS NOT NULL))
)
"#;

const CODE_UNIQUE_CONSTRAINT: &str = "coupons_code_key";

/// Postgres-backed coupon repository.
///
/// Uses the SQLx connection pool (thread-safe, `Send + Sync`). Code uniqueness is
/// a table constraint; the version check on update is part of the `WHERE`
/// clause, so check and write are a single atomic statement.
#[derive(Debug, Clone)]
pub struct PostgresCouponRepository {
    pool: Arc<PgPool>,
}

impl PostgresCouponRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect a pool to `database_url` and wrap it.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `coupons` table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::query(CREATE_TABLE)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn exists(&self, id: CouponId) -> Result<bool, RepositoryError> {
        let found: Option<(uuid::Uuid,)> = sqlx::query_as("SELECT id FROM coupons WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("exists", e))?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl CouponRepository for PostgresCouponRepository {
    #[instrument(
        skip(self, coupon),
        fields(code = %coupon.code(), coupon_id = tracing::field::Empty),
        err
    )]
    async fn insert(&self, coupon: NewCoupon) -> Result<Coupon, RepositoryError> {
        let persisted = coupon.into_persisted(CouponId::new());
        let version = version_to_db(persisted.version())?;

        sqlx::query(
            r#"
            INSERT INTO coupons (
                id,
                code,
                description,
                discount_value,
                expiration_date,
                status,
                published,
                deleted_at,
                version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(persisted.id().as_uuid())
        .bind(persisted.code().as_str())
        .bind(persisted.description())
        .bind(persisted.discount_value())
        .bind(persisted.expiration_date())
        .bind(persisted.status().as_str())
        .bind(persisted.published())
        .bind(persisted.deleted_at())
        .bind(version)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if is_code_violation(&e) {
                RepositoryError::DuplicateCode(persisted.code().to_string())
            } else {
                map_sqlx_error("insert_coupon", e)
            }
        })?;

        Span::current().record("coupon_id", tracing::field::display(persisted.id()));
        Ok(persisted)
    }

    #[instrument(
        skip(self, coupon),
        fields(coupon_id = %coupon.id()),
        err
    )]
    async fn update(
        &self,
        coupon: &Coupon,
        expected_version: u64,
    ) -> Result<(), RepositoryError> {
        let new_version = version_to_db(coupon.version())?;

        let result = sqlx::query(
            r#"
            UPDATE coupons
            SET status = $2, deleted_at = $3, version = $4
            WHERE id = $1 AND version = $5
            "#,
        )
        .bind(coupon.id().as_uuid())
        .bind(coupon.status().as_str())
        .bind(coupon.deleted_at())
        .bind(new_version)
        .bind(version_to_db(expected_version)?)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_coupon", e))?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        if self.exists(coupon.id_typed()).await? {
            Err(RepositoryError::Concurrency(format!(
                "coupon {} was modified concurrently (expected version {})",
                coupon.id(),
                expected_version
            )))
        } else {
            Err(RepositoryError::NotFound(coupon.id_typed()))
        }
    }

    #[instrument(skip(self), fields(coupon_id = %id), err)]
    async fn find_by_id(&self, id: CouponId) -> Result<Option<Coupon>, RepositoryError> {
        let row: Option<CouponRow> = sqlx::query_as(
            r#"
            SELECT
                id,
                code,
                description,
                discount_value,
                expiration_date,
                status,
                published,
                deleted_at,
                version
            FROM coupons
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.map(CouponRow::into_coupon).transpose()
    }
}

fn version_to_db(version: u64) -> Result<i64, RepositoryError> {
    i64::try_from(version)
        .map_err(|_| RepositoryError::Corrupt(format!("version {version} overflows BIGINT")))
}

/// Map SQLx errors to `RepositoryError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => RepositoryError::Backend(format!(
            "database error in {}: {} (code {:?})",
            operation,
            db_err.message(),
            db_err.code()
        )),
        sqlx::Error::PoolClosed => {
            RepositoryError::Backend(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            RepositoryError::Backend(format!("connection pool timed out in {operation}"))
        }
        other => RepositoryError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

/// Check if an error is a unique violation on the `code` column.
fn is_code_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        let unique = db_err.code().is_some_and(|code| code.as_ref() == "23505");
        return unique && db_err.constraint() == Some(CODE_UNIQUE_CONSTRAINT);
    }
    false
}

// SQLx row types

#[derive(Debug)]
struct CouponRow {
    id: uuid::Uuid,
    code: String,
    description: String,
    discount_value: Decimal,
    expiration_date: DateTime<Utc>,
    status: String,
    published: bool,
    deleted_at: Option<DateTime<Utc>>,
    version: i64,
}

impl<'r> FromRow<'r, PgRow> for CouponRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CouponRow {
            id: row.try_get("id")?,
            code: row.try_get("code")?,
            description: row.try_get("description")?,
            discount_value: row.try_get("discount_value")?,
            expiration_date: row.try_get("expiration_date")?,
            status: row.try_get("status")?,
            published: row.try_get("published")?,
            deleted_at: row.try_get("deleted_at")?,
            version: row.try_get("version")?,
        })
    }
}

impl CouponRow {
    fn into_coupon(self) -> Result<Coupon, RepositoryError> {
        let id = self.id;
        let status: CouponStatus = self
            .status
            .parse()
            .map_err(|e| RepositoryError::Corrupt(format!("coupon {id}: {e}")))?;
        let version = u64::try_from(self.version)
            .map_err(|_| RepositoryError::Corrupt(format!("coupon {id}: negative version")))?;

        Coupon::rehydrate(CouponSnapshot {
            id: CouponId::from_uuid(id),
            code: self.code,
            description: self.description,
            discount_value: self.discount_value,
            expiration_date: self.expiration_date,
            published: self.published,
            status,
            deleted_at: self.deleted_at,
            version,
        })
        .map_err(|e| RepositoryError::Corrupt(format!("coupon {id}: {e}")))
    }
}

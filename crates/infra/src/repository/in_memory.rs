use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use couponapi_core::{AggregateRoot, CouponId, check_version};
use couponapi_coupons::{Coupon, NewCoupon};

use super::r#trait::{CouponRepository, RepositoryError};

/// In-memory coupon store.
///
/// Intended for tests/dev. Enforces the same code-uniqueness and version rules
/// as the Postgres store so service behavior is identical on both.
#[derive(Debug, Default)]
pub struct InMemoryCouponRepository {
    coupons: RwLock<HashMap<CouponId, Coupon>>,
}

impl InMemoryCouponRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored coupons (retired ones included).
    pub fn len(&self) -> Result<usize, RepositoryError> {
        let coupons = self.coupons.read().map_err(|_| poisoned())?;
        Ok(coupons.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl CouponRepository for InMemoryCouponRepository {
    async fn insert(&self, coupon: NewCoupon) -> Result<Coupon, RepositoryError> {
        let mut coupons = self.coupons.write().map_err(|_| poisoned())?;

        if coupons.values().any(|c| c.code() == coupon.code()) {
            return Err(RepositoryError::DuplicateCode(coupon.code().to_string()));
        }

        let persisted = coupon.into_persisted(CouponId::new());
        coupons.insert(persisted.id_typed(), persisted.clone());
        Ok(persisted)
    }

    async fn update(
        &self,
        coupon: &Coupon,
        expected_version: u64,
    ) -> Result<(), RepositoryError> {
        let mut coupons = self.coupons.write().map_err(|_| poisoned())?;

        let stored = coupons
            .get_mut(coupon.id())
            .ok_or(RepositoryError::NotFound(coupon.id_typed()))?;

        check_version(expected_version, stored.version())
            .map_err(|e| RepositoryError::Concurrency(e.to_string()))?;

        if stored.code() != coupon.code() {
            return Err(RepositoryError::Corrupt(format!(
                "code of coupon {} is immutable",
                coupon.id()
            )));
        }

        *stored = coupon.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: CouponId) -> Result<Option<Coupon>, RepositoryError> {
        let coupons = self.coupons.read().map_err(|_| poisoned())?;
        Ok(coupons.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    fn new_coupon(code: &str) -> NewCoupon {
        NewCoupon::new(code, "desc", Decimal::ONE, Utc::now() + Duration::hours(1), Some(true))
            .unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_id_and_find_returns_it() {
        let repo = InMemoryCouponRepository::new();
        let saved = repo.insert(new_coupon("ABC-123")).await.unwrap();

        assert_eq!(saved.version(), 1);
        let found = repo.find_by_id(saved.id_typed()).await.unwrap().unwrap();
        assert_eq!(found.code().as_str(), "ABC123");
        assert_eq!(found, saved);
    }

    #[tokio::test]
    async fn insert_assigns_distinct_ids() {
        let repo = InMemoryCouponRepository::new();
        let a = repo.insert(new_coupon("AAAAAA")).await.unwrap();
        let b = repo.insert(new_coupon("BBBBBB")).await.unwrap();
        assert_ne!(a.id_typed(), b.id_typed());
        assert_eq!(repo.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_normalized_code() {
        let repo = InMemoryCouponRepository::new();
        repo.insert(new_coupon("ABC123")).await.unwrap();

        let err = repo.insert(new_coupon("ABC-123")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateCode(code) if code == "ABC123"));
        assert_eq!(repo.len().unwrap(), 1);
    }

    #[test]
    fn len_reports_poisoned_lock() {
        let repo = InMemoryCouponRepository::new();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = repo.coupons.write().unwrap();
            panic!("poison the lock");
        }));

        assert!(matches!(repo.len(), Err(RepositoryError::Backend(_))));
        assert!(repo.is_empty().is_err());
    }

    #[tokio::test]
    async fn find_missing_is_none() {
        let repo = InMemoryCouponRepository::new();
        assert!(repo.find_by_id(CouponId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_applies_when_version_matches() {
        let repo = InMemoryCouponRepository::new();
        let mut coupon = repo.insert(new_coupon("ABC123")).await.unwrap();
        coupon.mark_deleted().unwrap();

        repo.update(&coupon, 1).await.unwrap();

        let stored = repo.find_by_id(coupon.id_typed()).await.unwrap().unwrap();
        assert!(stored.is_deleted());
        assert_eq!(stored.version(), 2);
    }

    #[tokio::test]
    async fn update_rejects_stale_version() {
        let repo = InMemoryCouponRepository::new();
        let loaded = repo.insert(new_coupon("ABC123")).await.unwrap();

        let mut first = loaded.clone();
        first.mark_deleted().unwrap();
        repo.update(&first, 1).await.unwrap();

        let mut second = loaded;
        second.mark_deleted().unwrap();
        let err = repo.update(&second, 1).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Concurrency(_)));
    }

    #[tokio::test]
    async fn update_of_unknown_coupon_is_not_found() {
        let repo = InMemoryCouponRepository::new();
        let coupon = new_coupon("ABC123").into_persisted(CouponId::new());
        let err = repo.update(&coupon, 1).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(id) if id == coupon.id_typed()));
    }
}

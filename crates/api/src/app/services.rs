use std::sync::Arc;

use couponapi_infra::{
    CouponRepository, CouponService, InMemoryCouponRepository, PostgresCouponRepository,
    RepositoryError, StorageConfig,
};

/// Coupon service over a type-erased store (in-memory or Postgres).
pub type DynCouponService = CouponService<Arc<dyn CouponRepository>>;

/// Everything the handlers need, shared behind an `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub coupons: DynCouponService,
}

impl AppServices {
    pub fn new(repository: Arc<dyn CouponRepository>) -> Self {
        Self {
            coupons: CouponService::new(repository),
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryCouponRepository::new()))
    }
}

pub async fn build_services(storage: &StorageConfig) -> Result<AppServices, RepositoryError> {
    match storage {
        StorageConfig::InMemory => {
            tracing::warn!("DATABASE_URL not set; coupons are kept in memory and lost on restart");
            Ok(AppServices::in_memory())
        }
        StorageConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let repo = PostgresCouponRepository::connect(database_url, *max_connections).await?;
            repo.migrate().await?;
            tracing::info!(max_connections, "using postgres coupon store");
            Ok(AppServices::new(Arc::new(repo)))
        }
    }
}

//! Dashboard counters.

use serde::Serialize;
use sqlx::PgPool;

use xstore_core::Money;

use super::RepositoryError;

/// Headline numbers for the back-office home page.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DashboardStats {
    pub product_count: i64,
    pub city_count: i64,
    pub order_count: i64,
    pub pending_order_count: i64,
    /// Sum of order totals, excluding cancelled orders.
    pub revenue: Money,
}

/// Repository for aggregate queries.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    /// Create a new dashboard repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load all counters in one round trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<DashboardStats, RepositoryError> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM xstore.product) AS product_count,
                (SELECT COUNT(*) FROM xstore.city) AS city_count,
                (SELECT COUNT(*) FROM xstore."order") AS order_count,
                (SELECT COUNT(*) FROM xstore."order" WHERE status = 'pending') AS pending_order_count,
                (SELECT COALESCE(SUM(total), 0)::NUMERIC(14, 2)
                   FROM xstore."order" WHERE status <> 'cancelled') AS revenue
            "#,
        )
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }
}

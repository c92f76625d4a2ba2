//! Aggregate queries behind the dashboard statistics.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use distrimart_core::OrderStatus;

use super::RepositoryError;
use crate::services::{StatsLoader, StatusCount, StoreStats};

/// Fill in every status so the dashboard always shows all of them.
fn complete_counts(rows: &[(OrderStatus, i64)]) -> Vec<StatusCount> {
    OrderStatus::ALL
        .iter()
        .map(|&status| StatusCount {
            status,
            count: rows
                .iter()
                .find(|(s, _)| *s == status)
                .map_or(0, |(_, count)| *count),
        })
        .collect()
}

/// [`StatsLoader`] running the aggregate queries against Postgres.
#[derive(Clone)]
pub struct PgStatsLoader {
    pool: PgPool,
}

impl PgStatsLoader {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl StatsLoader for PgStatsLoader {
    #[instrument(skip(self))]
    async fn load(&self) -> Result<StoreStats, RepositoryError> {
        let (distributors, active_products, pending_quotes): (i64, i64, i64) = sqlx::query_as(
            r"
            SELECT
                (SELECT COUNT(*) FROM commerce.distributor),
                (SELECT COUNT(*) FROM commerce.product WHERE active),
                (SELECT COUNT(*) FROM commerce.quote_request WHERE status = 'pending')
            ",
        )
        .fetch_one(&self.pool)
        .await?;

        let by_status: Vec<(OrderStatus, i64, Decimal)> = sqlx::query_as(
            r"
            SELECT status, COUNT(*), COALESCE(SUM(subtotal), 0)
            FROM commerce.customer_order
            GROUP BY status
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let revenue = by_status
            .iter()
            .filter(|(status, _, _)| status.counts_as_revenue())
            .map(|(_, _, total)| *total)
            .sum();
        let counts: Vec<(OrderStatus, i64)> = by_status
            .iter()
            .map(|(status, count, _)| (*status, *count))
            .collect();

        Ok(StoreStats {
            distributors,
            active_products,
            orders_by_status: complete_counts(&counts),
            revenue,
            pending_quotes,
            computed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_counts_includes_every_status() {
        let counts = complete_counts(&[(OrderStatus::Shipped, 4), (OrderStatus::Pending, 2)]);

        assert_eq!(counts.len(), OrderStatus::ALL.len());
        let shipped = counts.iter().find(|c| c.status == OrderStatus::Shipped);
        assert_eq!(shipped.map(|c| c.count), Some(4));
        let cancelled = counts.iter().find(|c| c.status == OrderStatus::Cancelled);
        assert_eq!(cancelled.map(|c| c.count), Some(0));
    }
}

//! Subscription repository

use sqlx::SqlitePool;

use agentmart_types::{AgentId, Subscription, SubscriptionId, SubscriptionStatus, UserId};

use crate::models::convert_all;
use crate::{DbError, DbResult, DbSubscription};

/// Subscription repository
///
/// The partial unique index `subscriptions_active_pair_key` allows at most
/// one active row per (user, agent); [`SubscriptionRepo::create`] surfaces
/// a violation as `DbError::Duplicate` on that index.
pub struct SubscriptionRepo {
    pool: SqlitePool,
}

impl SubscriptionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, subscription: Subscription) -> DbResult<Subscription> {
        let row = sqlx::query_as::<_, DbSubscription>(
            r#"
            INSERT INTO subscriptions (id, user_id, agent_id, status, payment_ref, amount,
                start_date, end_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(subscription.id.0)
        .bind(subscription.user_id.0)
        .bind(subscription.agent_id.0)
        .bind(subscription.status.as_str())
        .bind(&subscription.payment_ref)
        .bind(subscription.amount.to_string())
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(subscription.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DbError::on_unique(
                e,
                "subscriptions",
                "subscriptions_active_pair_key",
                format!("{}/{}", subscription.user_id, subscription.agent_id),
            )
        })?;
        Subscription::try_from(row)
    }

    pub async fn find_by_id(&self, id: SubscriptionId) -> DbResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, DbSubscription>("SELECT * FROM subscriptions WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Subscription::try_from).transpose()
    }

    /// The active subscription of `user_id` to `agent_id`, if any
    pub async fn find_active(
        &self,
        user_id: UserId,
        agent_id: AgentId,
    ) -> DbResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, DbSubscription>(
            "SELECT * FROM subscriptions WHERE user_id = ? AND agent_id = ? AND status = 'active'",
        )
        .bind(user_id.0)
        .bind(agent_id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Subscription::try_from).transpose()
    }

    pub async fn list_by_user(&self, user_id: UserId) -> DbResult<Vec<Subscription>> {
        let rows = sqlx::query_as::<_, DbSubscription>(
            "SELECT * FROM subscriptions WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    pub async fn list_by_status(&self, status: SubscriptionStatus) -> DbResult<Vec<Subscription>> {
        let rows = sqlx::query_as::<_, DbSubscription>(
            "SELECT * FROM subscriptions WHERE status = ? ORDER BY created_at DESC",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    pub async fn list_all(&self) -> DbResult<Vec<Subscription>> {
        let rows =
            sqlx::query_as::<_, DbSubscription>("SELECT * FROM subscriptions ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        convert_all(rows)
    }

    pub async fn set_status(
        &self,
        id: SubscriptionId,
        status: SubscriptionStatus,
    ) -> DbResult<Subscription> {
        let row = sqlx::query_as::<_, DbSubscription>(
            "UPDATE subscriptions SET status = ? WHERE id = ? RETURNING *",
        )
        .bind(status.as_str())
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::on_unique(e, "subscriptions", "subscriptions_active_pair_key", id))?
        .ok_or_else(|| DbError::not_found("subscriptions", id))?;
        Subscription::try_from(row)
    }
}

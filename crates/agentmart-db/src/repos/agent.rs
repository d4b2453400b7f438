//! Agent repository

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::SqlitePool;

use agentmart_types::{Agent, AgentId, AgentStatus};

use crate::models::convert_all;
use crate::{DbAgent, DbError, DbResult};

/// Agent listing repository
pub struct AgentRepo {
    pool: SqlitePool,
}

impl AgentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, agent: Agent) -> DbResult<Agent> {
        let row = sqlx::query_as::<_, DbAgent>(
            r#"
            INSERT INTO agents (id, name, description, capabilities, status, category, price,
                price_type, created_by, image_url, api_endpoint, usage_count, rating,
                created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(agent.id.0)
        .bind(&agent.name)
        .bind(&agent.description)
        .bind(Json(&agent.capabilities))
        .bind(agent.status.as_str())
        .bind(&agent.category)
        .bind(agent.price.to_string())
        .bind(agent.price_type.as_str())
        .bind(agent.created_by.0)
        .bind(&agent.image_url)
        .bind(&agent.api_endpoint)
        .bind(usage_column(agent.usage_count))
        .bind(agent.rating)
        .bind(agent.created_at)
        .bind(agent.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Agent::try_from(row)
    }

    pub async fn find_by_id(&self, id: AgentId) -> DbResult<Option<Agent>> {
        let row = sqlx::query_as::<_, DbAgent>("SELECT * FROM agents WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Agent::try_from).transpose()
    }

    pub async fn list_all(&self) -> DbResult<Vec<Agent>> {
        let rows = sqlx::query_as::<_, DbAgent>("SELECT * FROM agents ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    pub async fn list_by_status(&self, status: AgentStatus) -> DbResult<Vec<Agent>> {
        let rows = sqlx::query_as::<_, DbAgent>(
            "SELECT * FROM agents WHERE status = ? ORDER BY created_at DESC",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    pub async fn list_by_category(&self, category: &str) -> DbResult<Vec<Agent>> {
        let rows = sqlx::query_as::<_, DbAgent>(
            "SELECT * FROM agents WHERE category = ? ORDER BY created_at DESC",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    /// Apply `update` to the stored agent inside one write transaction
    pub async fn update<F>(&self, id: AgentId, update: F) -> DbResult<Agent>
    where
        F: FnOnce(&mut Agent),
    {
        let mut tx = self.pool.begin().await?;

        // Take the write lock before reading so the patch cannot interleave
        let touched = sqlx::query("UPDATE agents SET id = id WHERE id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if touched == 0 {
            return Err(DbError::not_found("agents", id));
        }

        let row = sqlx::query_as::<_, DbAgent>("SELECT * FROM agents WHERE id = ?")
            .bind(id.0)
            .fetch_one(&mut *tx)
            .await?;
        let mut agent = Agent::try_from(row)?;
        update(&mut agent);

        let row = sqlx::query_as::<_, DbAgent>(
            r#"
            UPDATE agents SET name = ?, description = ?, capabilities = ?, status = ?,
                category = ?, price = ?, price_type = ?, image_url = ?, api_endpoint = ?,
                usage_count = ?, rating = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&agent.name)
        .bind(&agent.description)
        .bind(Json(&agent.capabilities))
        .bind(agent.status.as_str())
        .bind(&agent.category)
        .bind(agent.price.to_string())
        .bind(agent.price_type.as_str())
        .bind(&agent.image_url)
        .bind(&agent.api_endpoint)
        .bind(usage_column(agent.usage_count))
        .bind(agent.rating)
        .bind(agent.updated_at)
        .bind(id.0)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Agent::try_from(row)
    }

    /// Bump the usage counter in a single statement
    pub async fn increment_usage(&self, id: AgentId, now: DateTime<Utc>) -> DbResult<Agent> {
        let row = sqlx::query_as::<_, DbAgent>(
            r#"
            UPDATE agents SET usage_count = usage_count + 1, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("agents", id))?;
        Agent::try_from(row)
    }

    pub async fn delete(&self, id: AgentId) -> DbResult<Agent> {
        let row = sqlx::query_as::<_, DbAgent>("DELETE FROM agents WHERE id = ? RETURNING *")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("agents", id))?;
        Agent::try_from(row)
    }
}

fn usage_column(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

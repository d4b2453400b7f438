//! Analytics event repository (append-only)

use sqlx::SqlitePool;

use agentmart_types::{AgentId, AnalyticsEvent};

use crate::models::convert_all;
use crate::{DbAnalyticsEvent, DbResult};

pub struct AnalyticsRepo {
    pool: SqlitePool,
}

impl AnalyticsRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, event: AnalyticsEvent) -> DbResult<AnalyticsEvent> {
        let row = sqlx::query_as::<_, DbAnalyticsEvent>(
            r#"
            INSERT INTO analytics_events (id, agent_id, user_id, action, metadata, timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(event.id.0)
        .bind(event.agent_id.0)
        .bind(event.user_id.map(|id| id.0))
        .bind(&event.action)
        .bind(&event.metadata)
        .bind(event.timestamp)
        .fetch_one(&self.pool)
        .await?;
        AnalyticsEvent::try_from(row)
    }

    pub async fn list_by_agent(&self, agent_id: AgentId) -> DbResult<Vec<AnalyticsEvent>> {
        let rows = sqlx::query_as::<_, DbAnalyticsEvent>(
            "SELECT * FROM analytics_events WHERE agent_id = ? ORDER BY timestamp",
        )
        .bind(agent_id.0)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    pub async fn list_all(&self) -> DbResult<Vec<AnalyticsEvent>> {
        let rows =
            sqlx::query_as::<_, DbAnalyticsEvent>("SELECT * FROM analytics_events ORDER BY timestamp")
                .fetch_all(&self.pool)
                .await?;
        convert_all(rows)
    }
}

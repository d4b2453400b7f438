//! Site settings repository

use sqlx::SqlitePool;

use agentmart_types::Setting;

use crate::{DbResult, DbSetting};

pub struct SettingsRepo {
    pool: SqlitePool,
}

impl SettingsRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> DbResult<Option<Setting>> {
        let row = sqlx::query_as::<_, DbSetting>("SELECT * FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Setting::from))
    }

    /// Insert or overwrite by key
    pub async fn upsert(&self, setting: Setting) -> DbResult<Setting> {
        let row = sqlx::query_as::<_, DbSetting>(
            r#"
            INSERT INTO settings (key, value, updated_by, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_by = excluded.updated_by,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(&setting.key)
        .bind(&setting.value)
        .bind(setting.updated_by.0)
        .bind(setting.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(Setting::from(row))
    }

    pub async fn list_all(&self) -> DbResult<Vec<Setting>> {
        let rows = sqlx::query_as::<_, DbSetting>("SELECT * FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Setting::from).collect())
    }
}

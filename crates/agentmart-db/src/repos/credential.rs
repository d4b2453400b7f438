//! Sign-in credential repository

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use agentmart_types::UserId;

use crate::{DbCredential, DbError, DbResult};

/// Email-and-password credentials, one row per identity
pub struct CredentialRepo {
    pool: SqlitePool,
}

impl CredentialRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a credential. Fails with `Duplicate` on `credentials_email_key`
    /// if the email is already registered.
    pub async fn create(
        &self,
        email: &str,
        user_id: UserId,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> DbResult<DbCredential> {
        sqlx::query_as::<_, DbCredential>(
            r#"
            INSERT INTO credentials (email, user_id, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(user_id.0)
        .bind(password_hash)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::on_unique(e, "credentials", "credentials_email_key", email))
    }

    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<DbCredential>> {
        let credential =
            sqlx::query_as::<_, DbCredential>("SELECT * FROM credentials WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(credential)
    }
}

//! Transaction ledger repository

use sqlx::SqlitePool;

use agentmart_types::{Transaction, TransactionId, TransactionStatus, UserId};

use crate::models::convert_all;
use crate::{DbError, DbResult, DbTransaction};

pub struct TransactionRepo {
    pool: SqlitePool,
}

impl TransactionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, tx: Transaction) -> DbResult<Transaction> {
        let row = sqlx::query_as::<_, DbTransaction>(
            r#"
            INSERT INTO transactions (id, user_id, agent_id, amount, currency, status,
                payment_method, external_payment_ref, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(tx.id.0)
        .bind(tx.user_id.0)
        .bind(tx.agent_id.map(|id| id.0))
        .bind(tx.amount.to_string())
        .bind(&tx.currency)
        .bind(tx.status.as_str())
        .bind(&tx.payment_method)
        .bind(&tx.external_payment_ref)
        .bind(&tx.description)
        .bind(tx.created_at)
        .fetch_one(&self.pool)
        .await?;
        Transaction::try_from(row)
    }

    pub async fn find_by_id(&self, id: TransactionId) -> DbResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, DbTransaction>("SELECT * FROM transactions WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Transaction::try_from).transpose()
    }

    pub async fn list_by_user(&self, user_id: UserId) -> DbResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, DbTransaction>(
            "SELECT * FROM transactions WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    pub async fn list_by_status(&self, status: TransactionStatus) -> DbResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, DbTransaction>(
            "SELECT * FROM transactions WHERE status = ? ORDER BY created_at DESC",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    pub async fn list_all(&self) -> DbResult<Vec<Transaction>> {
        let rows =
            sqlx::query_as::<_, DbTransaction>("SELECT * FROM transactions ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        convert_all(rows)
    }

    pub async fn set_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> DbResult<Transaction> {
        let row = sqlx::query_as::<_, DbTransaction>(
            "UPDATE transactions SET status = ? WHERE id = ? RETURNING *",
        )
        .bind(status.as_str())
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("transactions", id))?;
        Transaction::try_from(row)
    }

    /// Move every ledger entry carrying the provider's payment reference to
    /// `status` in one statement. Returns the updated rows, empty if none
    /// matched.
    pub async fn set_status_by_payment_ref(
        &self,
        payment_ref: &str,
        status: TransactionStatus,
    ) -> DbResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, DbTransaction>(
            r#"
            UPDATE transactions SET status = ?
            WHERE external_payment_ref = ?
            RETURNING *
            "#,
        )
        .bind(status.as_str())
        .bind(payment_ref)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }
}

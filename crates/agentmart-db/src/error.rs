//! Database error types

use agentmart_types::MarketError;
use thiserror::Error;

/// Database operation errors
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Not found: {collection} {id}")]
    NotFound { collection: &'static str, id: String },

    #[error("Duplicate: {collection}.{constraint} already has key {key}")]
    Duplicate {
        collection: &'static str,
        constraint: &'static str,
        key: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DbError {
    /// Whether this is a violation of the named unique constraint
    pub fn is_duplicate_on(&self, constraint_name: &str) -> bool {
        matches!(self, Self::Duplicate { constraint, .. } if *constraint == constraint_name)
    }

    /// Map a unique violation from an insert to `Duplicate`; anything else
    /// stays a query error.
    pub(crate) fn on_unique(
        e: sqlx::Error,
        collection: &'static str,
        constraint: &'static str,
        key: impl ToString,
    ) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DbError::Duplicate {
                    collection,
                    constraint,
                    key: key.to_string(),
                };
            }
        }
        DbError::Query(e)
    }

    pub(crate) fn not_found(collection: &'static str, id: impl ToString) -> Self {
        DbError::NotFound {
            collection,
            id: id.to_string(),
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::Serialization(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(e.to_string())
    }
}

impl From<DbError> for MarketError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { collection, id } => MarketError::NotFound {
                entity: entity_name(collection),
                id,
            },
            other => MarketError::Storage(other.to_string()),
        }
    }
}

fn entity_name(collection: &'static str) -> &'static str {
    match collection {
        "profiles" => "Profile",
        "agents" => "Agent",
        "posts" => "Post",
        "subscriptions" => "Subscription",
        "transactions" => "Transaction",
        "analytics_events" => "Event",
        "settings" => "Setting",
        "credentials" => "Credential",
        other => other,
    }
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

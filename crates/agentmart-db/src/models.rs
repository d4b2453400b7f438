//! Database models - mapped from SQLite tables
//!
//! Rows carry storage types (UUID blobs, decimal text, enum text). Each
//! converts into its domain record with `TryFrom`, failing with
//! `DbError::Serialization` on a value the domain does not accept.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use sqlx::types::Json;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use agentmart_types::{
    Agent, AgentId, AnalyticsEvent, EventId, Post, PostId, Profile, ProfileId, Setting,
    Subscription, SubscriptionId, Transaction, TransactionId, UserId,
};

use crate::{DbError, DbResult};

#[derive(Debug, Clone, FromRow)]
pub struct DbProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbCredential {
    pub email: String,
    pub user_id: Uuid,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbAgent {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub capabilities: Json<Vec<String>>,
    pub status: String,
    pub category: String,
    pub price: String,
    pub price_type: String,
    pub created_by: Uuid,
    pub image_url: Option<String>,
    pub api_endpoint: Option<String>,
    pub usage_count: i64,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbPost {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub post_type: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbSubscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub agent_id: Uuid,
    pub status: String,
    pub payment_ref: Option<String>,
    pub amount: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub amount: String,
    pub currency: String,
    pub status: String,
    pub payment_method: String,
    pub external_payment_ref: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbAnalyticsEvent {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub metadata: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbSetting {
    pub key: String,
    pub value: String,
    pub updated_by: Uuid,
    pub updated_at: DateTime<Utc>,
}

/// Enum columns hold the serde name of the variant
fn parse_enum<T: DeserializeOwned>(column: &str, value: String) -> DbResult<T> {
    serde_json::from_value(serde_json::Value::String(value.clone()))
        .map_err(|e| DbError::Serialization(format!("{column} = {value:?}: {e}")))
}

fn parse_decimal(column: &str, value: &str) -> DbResult<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| DbError::Serialization(format!("{column} = {value:?}: {e}")))
}

impl TryFrom<DbProfile> for Profile {
    type Error = DbError;

    fn try_from(row: DbProfile) -> DbResult<Self> {
        Ok(Profile {
            id: ProfileId(row.id),
            user_id: UserId(row.user_id),
            name: row.name,
            email: row.email,
            role: parse_enum("profiles.role", row.role)?,
            avatar: row.avatar,
            bio: row.bio,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<DbAgent> for Agent {
    type Error = DbError;

    fn try_from(row: DbAgent) -> DbResult<Self> {
        let usage_count = u64::try_from(row.usage_count).map_err(|_| {
            DbError::Serialization(format!("agents.usage_count = {}", row.usage_count))
        })?;
        Ok(Agent {
            id: AgentId(row.id),
            name: row.name,
            description: row.description,
            capabilities: row.capabilities.0,
            status: parse_enum("agents.status", row.status)?,
            category: row.category,
            price: parse_decimal("agents.price", &row.price)?,
            price_type: parse_enum("agents.price_type", row.price_type)?,
            created_by: UserId(row.created_by),
            image_url: row.image_url,
            api_endpoint: row.api_endpoint,
            usage_count,
            rating: row.rating,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<DbPost> for Post {
    type Error = DbError;

    fn try_from(row: DbPost) -> DbResult<Self> {
        Ok(Post {
            id: PostId(row.id),
            agent_id: AgentId(row.agent_id),
            author_id: UserId(row.author_id),
            title: row.title,
            content: row.content,
            post_type: parse_enum("posts.post_type", row.post_type)?,
            published: row.published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<DbSubscription> for Subscription {
    type Error = DbError;

    fn try_from(row: DbSubscription) -> DbResult<Self> {
        Ok(Subscription {
            id: SubscriptionId(row.id),
            user_id: UserId(row.user_id),
            agent_id: AgentId(row.agent_id),
            status: parse_enum("subscriptions.status", row.status)?,
            payment_ref: row.payment_ref,
            amount: parse_decimal("subscriptions.amount", &row.amount)?,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<DbTransaction> for Transaction {
    type Error = DbError;

    fn try_from(row: DbTransaction) -> DbResult<Self> {
        Ok(Transaction {
            id: TransactionId(row.id),
            user_id: UserId(row.user_id),
            agent_id: row.agent_id.map(AgentId),
            amount: parse_decimal("transactions.amount", &row.amount)?,
            currency: row.currency,
            status: parse_enum("transactions.status", row.status)?,
            payment_method: row.payment_method,
            external_payment_ref: row.external_payment_ref,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<DbAnalyticsEvent> for AnalyticsEvent {
    type Error = DbError;

    fn try_from(row: DbAnalyticsEvent) -> DbResult<Self> {
        Ok(AnalyticsEvent {
            id: EventId(row.id),
            agent_id: AgentId(row.agent_id),
            user_id: row.user_id.map(UserId),
            action: row.action,
            metadata: row.metadata,
            timestamp: row.timestamp,
        })
    }
}

impl From<DbSetting> for Setting {
    fn from(row: DbSetting) -> Self {
        Setting {
            key: row.key,
            value: row.value,
            updated_by: UserId(row.updated_by),
            updated_at: row.updated_at,
        }
    }
}

/// Convert a batch of rows, failing on the first bad one
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> DbResult<Vec<T>>
where
    T: TryFrom<R, Error = DbError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentmart_types::{AgentStatus, PriceType, Role};

    fn agent_row() -> DbAgent {
        let now = Utc::now();
        DbAgent {
            id: Uuid::new_v4(),
            name: "Bot".to_string(),
            description: "d".to_string(),
            capabilities: Json(vec!["search".to_string()]),
            status: "pending".to_string(),
            category: "tools".to_string(),
            price: "9.99".to_string(),
            price_type: "one-time".to_string(),
            created_by: Uuid::new_v4(),
            image_url: None,
            api_endpoint: None,
            usage_count: 3,
            rating: 4.5,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_agent_row_converts() {
        let agent = Agent::try_from(agent_row()).unwrap();
        assert_eq!(agent.status, AgentStatus::Pending);
        assert_eq!(agent.price_type, PriceType::OneTime);
        assert_eq!(agent.price.to_string(), "9.99");
        assert_eq!(agent.usage_count, 3);
        assert_eq!(agent.capabilities, vec!["search".to_string()]);
    }

    #[test]
    fn test_unknown_enum_text_is_rejected() {
        let mut row = agent_row();
        row.status = "archived".to_string();
        let err = Agent::try_from(row).unwrap_err();
        assert!(matches!(err, DbError::Serialization(msg) if msg.contains("agents.status")));
    }

    #[test]
    fn test_negative_usage_is_rejected() {
        let mut row = agent_row();
        row.usage_count = -1;
        assert!(Agent::try_from(row).is_err());
    }

    #[test]
    fn test_role_text_matches_as_str() {
        for role in [Role::Admin, Role::Agent, Role::User] {
            let parsed: Role = parse_enum("profiles.role", role.as_str().to_string()).unwrap();
            assert_eq!(parsed, role);
        }
    }
}

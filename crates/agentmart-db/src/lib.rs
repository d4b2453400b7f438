//! AgentMart Database Layer
//!
//! SQLite persistence for the marketplace through `sqlx`.
//!
//! # Architecture
//!
//! - **Schema**: `migrations/` applied on connect; uniqueness (one profile
//!   per identity, one active subscription per pair) lives in the schema
//! - **Bootstrap row**: a single-row table recording who claimed the
//!   first-admin slot, claimed in the same transaction as the profile insert
//! - **User locks**: per-identity async mutexes for check-then-insert flows
//!
//! Every write is committed before the call returns; there is no separate
//! save step.
//!
//! # Repository Pattern
//!
//! Each domain has its own repository with CRUD and domain-specific queries.
//! Repositories are cheap handles onto the shared pool.

pub mod config;
pub mod error;
pub mod locks;
pub mod models;
pub mod repos;

use serde::Serialize;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use agentmart_types::UserId;

pub use config::DatabaseConfig;
pub use error::{DbError, DbResult};
pub use locks::{KeyedGuard, KeyedLocks};
pub use models::*;
pub use repos::*;

/// Connection pool plus the per-identity locks. Clones share both.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    user_locks: Arc<KeyedLocks<UserId>>,
    config: DatabaseConfig,
}

impl Database {
    /// Open the configured database and apply migrations
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("Opening SQLite database: {}", config.url);

        let mut options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| DbError::Connection(format!("{}: {}", config.url, e)))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

        // An in-memory database lives and dies with its one connection
        let pool_options = if config.is_persistent() {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
            SqlitePoolOptions::new().max_connections(config.max_connections.max(1))
        } else {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection(format!("SQLite: {}", e)))?;

        let db = Self {
            pool,
            user_locks: Arc::new(KeyedLocks::new()),
            config: config.clone(),
        };
        if config.run_migrations {
            db.migrate().await?;
        }
        info!(persistent = config.is_persistent(), "Database ready");
        Ok(db)
    }

    /// Fresh private in-memory database with the schema applied
    pub async fn in_memory() -> DbResult<Self> {
        Self::connect(&DatabaseConfig::in_memory()).await
    }

    /// Run database migrations
    pub async fn migrate(&self) -> DbResult<()> {
        debug!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Serialize check-then-insert flows for one identity
    pub async fn lock_user(&self, user: UserId) -> KeyedGuard<UserId> {
        self.user_locks.lock(&user).await
    }

    /// Health check with per-table row counts
    pub async fn health_check(&self) -> DbResult<HealthStatus> {
        let (profiles, agents, posts, subscriptions, transactions, analytics_events) =
            sqlx::query_as::<_, (i64, i64, i64, i64, i64, i64)>(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM profiles),
                    (SELECT COUNT(*) FROM agents),
                    (SELECT COUNT(*) FROM posts),
                    (SELECT COUNT(*) FROM subscriptions),
                    (SELECT COUNT(*) FROM transactions),
                    (SELECT COUNT(*) FROM analytics_events)
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(HealthStatus {
            healthy: true,
            persistent: self.config.is_persistent(),
            profiles: count(profiles),
            agents: count(agents),
            posts: count(posts),
            subscriptions: count(subscriptions),
            transactions: count(transactions),
            analytics_events: count(analytics_events),
        })
    }

    /// Create repository instances
    pub fn profile_repo(&self) -> ProfileRepo {
        ProfileRepo::new(self.pool.clone())
    }

    pub fn credential_repo(&self) -> CredentialRepo {
        CredentialRepo::new(self.pool.clone())
    }

    pub fn agent_repo(&self) -> AgentRepo {
        AgentRepo::new(self.pool.clone())
    }

    pub fn post_repo(&self) -> PostRepo {
        PostRepo::new(self.pool.clone())
    }

    pub fn subscription_repo(&self) -> SubscriptionRepo {
        SubscriptionRepo::new(self.pool.clone())
    }

    pub fn transaction_repo(&self) -> TransactionRepo {
        TransactionRepo::new(self.pool.clone())
    }

    pub fn analytics_repo(&self) -> AnalyticsRepo {
        AnalyticsRepo::new(self.pool.clone())
    }

    pub fn settings_repo(&self) -> SettingsRepo {
        SettingsRepo::new(self.pool.clone())
    }
}

fn count(n: i64) -> usize {
    usize::try_from(n).unwrap_or(0)
}

/// Store health and size
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub persistent: bool,
    pub profiles: usize,
    pub agents: usize,
    pub posts: usize,
    pub subscriptions: usize,
    pub transactions: usize,
    pub analytics_events: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentmart_types::{
        Agent, AgentId, AgentStatus, PriceType, Profile, ProfileId, Role, Subscription,
        SubscriptionId, SubscriptionStatus, Transaction, TransactionId, TransactionStatus,
    };
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn profile(user_id: UserId) -> Profile {
        Profile {
            id: ProfileId::new(),
            user_id,
            name: "Test".to_string(),
            email: "t@example.com".to_string(),
            role: Role::User,
            avatar: None,
            bio: None,
            created_at: Utc::now(),
        }
    }

    fn agent(created_by: UserId, status: AgentStatus) -> Agent {
        let now = Utc::now();
        Agent {
            id: AgentId::new(),
            name: "Bot".to_string(),
            description: "d".to_string(),
            capabilities: vec!["chat".to_string()],
            status,
            category: "tools".to_string(),
            price: dec!(5),
            price_type: PriceType::Subscription,
            created_by,
            image_url: None,
            api_endpoint: None,
            usage_count: 0,
            rating: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    fn subscription(user_id: UserId, agent_id: AgentId) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: SubscriptionId::new(),
            user_id,
            agent_id,
            status: SubscriptionStatus::Active,
            payment_ref: None,
            amount: dec!(5),
            start_date: now,
            end_date: None,
            created_at: now,
        }
    }

    fn pending_payment(user_id: UserId, payment_ref: &str) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            user_id,
            agent_id: None,
            amount: dec!(12.50),
            currency: "USD".to_string(),
            status: TransactionStatus::Pending,
            payment_method: "card".to_string(),
            external_payment_ref: Some(payment_ref.to_string()),
            description: "Agent purchase".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_only_first_profile_claims_admin() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.profile_repo();

        let mut first = profile(UserId::new());
        first.role = Role::User;
        let first = repo.create_claiming_bootstrap(first).await.unwrap();
        assert_eq!(first.role, Role::Admin);

        let mut second = profile(UserId::new());
        second.role = Role::Admin;
        let second = repo.create_claiming_bootstrap(second).await.unwrap();
        assert_eq!(second.role, Role::User);
    }

    #[tokio::test]
    async fn test_one_profile_per_identity() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.profile_repo();
        let user = UserId::new();
        repo.create_claiming_bootstrap(profile(user)).await.unwrap();

        let err = repo.create_claiming_bootstrap(profile(user)).await.unwrap_err();
        assert!(err.is_duplicate_on("profiles_user_id_key"));
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_insert_does_not_consume_bootstrap() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.profile_repo();

        // The duplicate insert rolls back the bootstrap claim with it
        let mut clash = profile(UserId::new());
        let existing = repo.create_claiming_bootstrap(clash.clone()).await.unwrap();
        sqlx::query("UPDATE bootstrap SET claimed_by = NULL, claimed_at = NULL")
            .execute(db.pool())
            .await
            .unwrap();
        clash.id = ProfileId::new();
        assert!(repo.create_claiming_bootstrap(clash).await.is_err());

        let next = repo.create_claiming_bootstrap(profile(UserId::new())).await.unwrap();
        assert_eq!(next.role, Role::Admin);
        assert_eq!(existing.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_last_admin_cannot_be_demoted() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.profile_repo();
        let admin = repo.create_claiming_bootstrap(profile(UserId::new())).await.unwrap();

        let outcome = repo.set_role(admin.id, Role::User).await.unwrap();
        assert_eq!(outcome, SetRoleOutcome::LastAdmin);

        let second = repo.create_claiming_bootstrap(profile(UserId::new())).await.unwrap();
        repo.set_role(second.id, Role::Admin).await.unwrap();
        let outcome = repo.set_role(admin.id, Role::User).await.unwrap();
        assert!(matches!(outcome, SetRoleOutcome::Updated(p) if p.role == Role::User));
        let admins = repo.list_all().await.unwrap();
        assert_eq!(admins.iter().filter(|p| p.role.is_admin()).count(), 1);

        let err = repo.set_role(ProfileId::new(), Role::User).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { collection: "profiles", .. }));
    }

    #[tokio::test]
    async fn test_active_pair_unique_until_cancelled() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.subscription_repo();
        let user = UserId::new();
        let agent_id = AgentId::new();

        let first = repo.create(subscription(user, agent_id)).await.unwrap();
        let err = repo.create(subscription(user, agent_id)).await.unwrap_err();
        assert!(err.is_duplicate_on("subscriptions_active_pair_key"));

        repo.set_status(first.id, SubscriptionStatus::Cancelled).await.unwrap();
        assert!(repo.find_active(user, agent_id).await.unwrap().is_none());
        repo.create(subscription(user, agent_id)).await.unwrap();
        assert_eq!(repo.list_by_user(user).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_status_follows_updates() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.agent_repo();
        let a = repo.create(agent(UserId::new(), AgentStatus::Pending)).await.unwrap();
        assert!(repo.list_by_status(AgentStatus::Active).await.unwrap().is_empty());

        repo.update(a.id, |agent| agent.status = AgentStatus::Active).await.unwrap();
        assert_eq!(repo.list_by_status(AgentStatus::Active).await.unwrap().len(), 1);
        assert!(repo.list_by_status(AgentStatus::Pending).await.unwrap().is_empty());

        let missing = repo.update(AgentId::new(), |_| {}).await.unwrap_err();
        assert!(matches!(missing, DbError::NotFound { collection: "agents", .. }));
    }

    #[tokio::test]
    async fn test_increment_usage() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.agent_repo();
        let a = repo.create(agent(UserId::new(), AgentStatus::Active)).await.unwrap();
        repo.increment_usage(a.id, Utc::now()).await.unwrap();
        let updated = repo.increment_usage(a.id, Utc::now()).await.unwrap();
        assert_eq!(updated.usage_count, 2);
        assert_eq!(updated.capabilities, vec!["chat".to_string()]);
    }

    #[tokio::test]
    async fn test_settle_updates_every_row_with_the_reference() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.transaction_repo();
        let user = UserId::new();
        repo.create(pending_payment(user, "pi_123")).await.unwrap();
        repo.create(pending_payment(user, "pi_123")).await.unwrap();
        let other = repo.create(pending_payment(user, "pi_999")).await.unwrap();

        let settled = repo
            .set_status_by_payment_ref("pi_123", TransactionStatus::Completed)
            .await
            .unwrap();
        assert_eq!(settled.len(), 2);
        assert!(settled.iter().all(|tx| tx.status == TransactionStatus::Completed));
        assert!(settled.iter().all(|tx| tx.amount == dec!(12.50)));

        let untouched = repo.find_by_id(other.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, TransactionStatus::Pending);

        let none = repo
            .set_status_by_payment_ref("pi_unknown", TransactionStatus::Failed)
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_health_counts() {
        let db = Database::in_memory().await.unwrap();
        db.agent_repo().create(agent(UserId::new(), AgentStatus::Active)).await.unwrap();
        let health = db.health_check().await.unwrap();
        assert!(health.healthy);
        assert!(!health.persistent);
        assert_eq!(health.agents, 1);
        assert_eq!(health.profiles, 0);
    }
}

//! AgentMart Marketplace - The authorization and state-transition core
//!
//! Every operation follows the same flow:
//!
//! ```text
//! Caller ──▶ Subject (profile role) ──▶ role gate ──▶ load target
//!        ──▶ ownership gate ──▶ validate ──▶ store operation
//! ```
//!
//! Mutations fail with [`MarketError`]; guarded reads answer with an empty
//! list or `None` instead. Which one applies is fixed per operation by the
//! policy table in `agentmart-policy`.
//!
//! # Example
//!
//! ```ignore
//! let market = Marketplace::new(Database::in_memory().await?);
//! let caller = Caller::User(user_id);
//! let me = market.profiles().create(caller, NewProfile { .. }).await?;
//! let agent = market.agents().create(caller, new_agent).await?;
//! ```

mod access;
pub mod agents;
pub mod analytics;
pub mod clock;
pub mod posts;
pub mod profiles;
pub mod settings;
pub mod subscriptions;
pub mod transactions;

pub use agents::AgentService;
pub use analytics::AnalyticsService;
pub use clock::{Clock, ManualClock, SystemClock};
pub use posts::PostService;
pub use profiles::ProfileService;
pub use settings::SettingsService;
pub use subscriptions::SubscriptionService;
pub use transactions::TransactionService;

pub use agentmart_types::{MarketError, Result};

use chrono::{DateTime, Utc};
use std::sync::Arc;

use agentmart_db::Database;

/// Shared handles every service works with
#[derive(Clone)]
pub(crate) struct Context {
    pub(crate) db: Database,
    clock: Arc<dyn Clock>,
}

impl Context {
    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

/// Entry point to every marketplace operation
#[derive(Clone)]
pub struct Marketplace {
    ctx: Context,
}

impl Marketplace {
    pub fn new(db: Database) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self {
            ctx: Context { db, clock },
        }
    }

    pub fn db(&self) -> &Database {
        &self.ctx.db
    }

    pub fn profiles(&self) -> ProfileService {
        ProfileService::new(self.ctx.clone())
    }

    pub fn agents(&self) -> AgentService {
        AgentService::new(self.ctx.clone())
    }

    pub fn posts(&self) -> PostService {
        PostService::new(self.ctx.clone())
    }

    pub fn subscriptions(&self) -> SubscriptionService {
        SubscriptionService::new(self.ctx.clone())
    }

    pub fn transactions(&self) -> TransactionService {
        TransactionService::new(self.ctx.clone())
    }

    pub fn analytics(&self) -> AnalyticsService {
        AnalyticsService::new(self.ctx.clone())
    }

    pub fn settings(&self) -> SettingsService {
        SettingsService::new(self.ctx.clone())
    }
}

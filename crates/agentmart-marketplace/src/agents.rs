//! Agent listing operations
//!
//! ```text
//! create (agent role) ──▶ pending ──(admin update)──▶ active ◀──▶ inactive
//! create (admin)      ──▶ active
//! ```

use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tracing::{debug, info};

use agentmart_policy::Operation;
use agentmart_types::{
    Agent, AgentFilter, AgentId, AgentPatch, AgentStatus, Caller, MarketError, MarketplaceStats, NewAgent,
    Result, Role, SubscriptionStatus, TransactionStatus,
};

use crate::access::{gate, ownership};
use crate::Context;

pub struct AgentService {
    ctx: Context,
}

impl AgentService {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Catalog listing with optional equality filters, newest first
    pub async fn list(&self, filter: AgentFilter) -> Result<Vec<Agent>> {
        let repo = self.ctx.db.agent_repo();
        let candidates = match (&filter.status, &filter.category) {
            (Some(status), _) => repo.list_by_status(*status).await?,
            (None, Some(category)) => repo.list_by_category(category).await?,
            (None, None) => repo.list_all().await?,
        };
        let mut agents: Vec<Agent> = candidates.into_iter().filter(|a| filter.matches(a)).collect();
        newest_first(&mut agents);
        debug!(count = agents.len(), "Agents listed");
        Ok(agents)
    }

    /// Active agents only
    pub async fn list_public(&self) -> Result<Vec<Agent>> {
        let mut agents = self.ctx.db.agent_repo().list_by_status(AgentStatus::Active).await?;
        newest_first(&mut agents);
        Ok(agents)
    }

    pub async fn get(&self, id: AgentId) -> Result<Option<Agent>> {
        Ok(self.ctx.db.agent_repo().find_by_id(id).await?)
    }

    /// List a new agent. Admin listings go live immediately; seller listings
    /// wait for review.
    pub async fn create(&self, caller: Caller, input: NewAgent) -> Result<Agent> {
        let subject = self.ctx.subject(caller).await?;
        gate(Operation::AgentCreate, &subject)?;
        let user_id = subject.user_id().ok_or(MarketError::Unauthenticated)?;
        input.validate()?;

        let status = if subject.role == Some(Role::Admin) {
            AgentStatus::Active
        } else {
            AgentStatus::Pending
        };
        let now = self.ctx.now();
        let agent = self
            .ctx
            .db
            .agent_repo()
            .create(Agent {
                id: AgentId::new(),
                name: input.name,
                description: input.description,
                capabilities: input.capabilities,
                status,
                category: input.category,
                price: input.price,
                price_type: input.price_type,
                created_by: user_id,
                image_url: input.image_url,
                api_endpoint: input.api_endpoint,
                usage_count: 0,
                rating: 0.0,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(agent_id = %agent.id, created_by = %user_id, status = %status, "Agent created");
        Ok(agent)
    }

    /// Apply a partial update (owner or admin)
    pub async fn update(&self, caller: Caller, id: AgentId, patch: AgentPatch) -> Result<Agent> {
        let subject = self.ctx.subject(caller).await?;
        gate(Operation::AgentUpdate, &subject)?;

        let repo = self.ctx.db.agent_repo();
        let agent = repo.find_by_id(id).await?.ok_or_else(|| MarketError::not_found("Agent", id))?;
        ownership(Operation::AgentUpdate, &subject, &agent.created_by)?;
        patch.validate()?;

        let now = self.ctx.now();
        let updated = repo
            .update(id, |a| {
                patch.apply(a);
                a.updated_at = now;
            })
            .await?;

        info!(agent_id = %id, status = %updated.status, "Agent updated");
        Ok(updated)
    }

    /// Delete a listing (admin only)
    pub async fn remove(&self, caller: Caller, id: AgentId) -> Result<()> {
        let subject = self.ctx.subject(caller).await?;
        gate(Operation::AgentRemove, &subject)?;

        let repo = self.ctx.db.agent_repo();
        if repo.find_by_id(id).await?.is_none() {
            return Err(MarketError::not_found("Agent", id));
        }
        repo.delete(id).await?;
        info!(agent_id = %id, "Agent removed");
        Ok(())
    }

    /// Count one use of an agent
    pub async fn increment_usage(&self, id: AgentId) -> Result<Agent> {
        let repo = self.ctx.db.agent_repo();
        if repo.find_by_id(id).await?.is_none() {
            return Err(MarketError::not_found("Agent", id));
        }
        let agent = repo.increment_usage(id, self.ctx.now()).await?;
        debug!(agent_id = %id, usage = agent.usage_count, "Usage recorded");
        Ok(agent)
    }

    /// Distinct categories in use, sorted
    pub async fn categories(&self) -> Result<Vec<String>> {
        let agents = self.ctx.db.agent_repo().list_all().await?;
        let categories: BTreeSet<String> = agents.into_iter().map(|a| a.category).collect();
        Ok(categories.into_iter().collect())
    }

    /// Marketplace-wide counters (admin only; `None` otherwise)
    pub async fn stats(&self, caller: Caller) -> Result<Option<MarketplaceStats>> {
        let subject = self.ctx.subject(caller).await?;
        if let Err(denied) = gate(Operation::AgentStats, &subject) {
            return denied.resolve(None);
        }

        let agents = self.ctx.db.agent_repo().list_all().await?;
        let active_subscriptions = self
            .ctx
            .db
            .subscription_repo()
            .list_by_status(SubscriptionStatus::Active)
            .await?
            .len();
        let total_revenue: Decimal = self
            .ctx
            .db
            .transaction_repo()
            .list_by_status(TransactionStatus::Completed)
            .await?
            .iter()
            .map(|t| t.amount)
            .sum();

        Ok(Some(MarketplaceStats {
            total_agents: agents.len() as u64,
            active_agents: count_status(&agents, AgentStatus::Active),
            pending_agents: count_status(&agents, AgentStatus::Pending),
            active_subscriptions: active_subscriptions as u64,
            total_revenue,
            total_usage: agents.iter().map(|a| a.usage_count).sum(),
        }))
    }
}

fn count_status(agents: &[Agent], status: AgentStatus) -> u64 {
    agents.iter().filter(|a| a.status == status).count() as u64
}

fn newest_first(agents: &mut [Agent]) {
    agents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

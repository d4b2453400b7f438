//! Subscription operations
//!
//! At most one active subscription exists per (user, agent). The check and
//! the insert run under the caller's lock, and the store's unique index
//! backs that up.

use std::collections::HashMap;
use tracing::{debug, info};

use agentmart_db::DbError;
use agentmart_policy::Operation;
use agentmart_types::{
    subscription_end_date, Agent, AgentId, Caller, MarketError, NewSubscription, Profile, Result, Subscription,
    SubscriptionId, SubscriptionStatus, SubscriptionView, SubscriptionWithAgent, UserId,
};

use crate::access::{gate, ownership};
use crate::Context;

pub struct SubscriptionService {
    ctx: Context,
}

impl SubscriptionService {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Subscribe the caller to an agent at the agent's current price
    pub async fn create(&self, caller: Caller, input: NewSubscription) -> Result<Subscription> {
        let subject = self.ctx.subject(caller).await?;
        gate(Operation::SubscriptionCreate, &subject)?;
        let user_id = subject.user_id().ok_or(MarketError::Unauthenticated)?;

        let agent = self
            .ctx
            .db
            .agent_repo()
            .find_by_id(input.agent_id)
            .await?
            .ok_or_else(|| MarketError::not_found("Agent", input.agent_id))?;

        let _guard = self.ctx.db.lock_user(user_id).await;
        let repo = self.ctx.db.subscription_repo();
        if repo.find_active(user_id, agent.id).await?.is_some() {
            return Err(MarketError::AlreadySubscribed);
        }

        let now = self.ctx.now();
        let subscription = repo
            .create(Subscription {
                id: SubscriptionId::new(),
                user_id,
                agent_id: agent.id,
                status: SubscriptionStatus::Active,
                payment_ref: input.payment_ref,
                amount: agent.price,
                start_date: now,
                end_date: subscription_end_date(agent.price_type, now),
                created_at: now,
            })
            .await
            .map_err(|e| match e {
                e if e.is_duplicate_on("subscriptions_active_pair_key") => MarketError::AlreadySubscribed,
                e => MarketError::from(e),
            })?;

        info!(
            subscription_id = %subscription.id,
            user_id = %user_id,
            agent_id = %agent.id,
            amount = %subscription.amount,
            "Subscribed"
        );
        Ok(subscription)
    }

    /// Cancel one of the caller's own subscriptions
    pub async fn cancel(&self, caller: Caller, id: SubscriptionId) -> Result<Subscription> {
        let subject = self.ctx.subject(caller).await?;
        gate(Operation::SubscriptionCancel, &subject)?;

        let repo = self.ctx.db.subscription_repo();
        let subscription = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| MarketError::not_found("Subscription", id))?;
        ownership(Operation::SubscriptionCancel, &subject, &subscription.user_id)?;

        let cancelled = repo.set_status(id, SubscriptionStatus::Cancelled).await?;
        info!(subscription_id = %id, agent_id = %cancelled.agent_id, "Subscription cancelled");
        Ok(cancelled)
    }

    /// The caller's active subscription to `agent_id`, if any
    pub async fn check(&self, caller: Caller, agent_id: AgentId) -> Result<Option<Subscription>> {
        let subject = self.ctx.subject(caller).await?;
        if let Err(denied) = gate(Operation::SubscriptionCheck, &subject) {
            return denied.resolve(None);
        }
        let Some(user_id) = subject.user_id() else {
            return Ok(None);
        };
        Ok(self.ctx.db.subscription_repo().find_active(user_id, agent_id).await?)
    }

    /// The caller's subscriptions of any status, newest first
    pub async fn list_mine(&self, caller: Caller) -> Result<Vec<SubscriptionWithAgent>> {
        let subject = self.ctx.subject(caller).await?;
        if let Err(denied) = gate(Operation::SubscriptionListMine, &subject) {
            return denied.resolve(Vec::new());
        }
        let Some(user_id) = subject.user_id() else {
            return Ok(Vec::new());
        };

        let mut subscriptions = self.ctx.db.subscription_repo().list_by_user(user_id).await?;
        newest_first(&mut subscriptions);
        let agents = self.agents_by_id().await?;

        Ok(subscriptions
            .into_iter()
            .map(|subscription| SubscriptionWithAgent {
                agent: agents.get(&subscription.agent_id).cloned(),
                subscription,
            })
            .collect())
    }

    /// Every subscription with its agent and subscriber (admin only)
    pub async fn list_all(&self, caller: Caller) -> Result<Vec<SubscriptionView>> {
        let subject = self.ctx.subject(caller).await?;
        if let Err(denied) = gate(Operation::SubscriptionListAll, &subject) {
            return denied.resolve(Vec::new());
        }

        let mut subscriptions = self.ctx.db.subscription_repo().list_all().await?;
        newest_first(&mut subscriptions);
        let agents = self.agents_by_id().await?;
        let profiles: HashMap<UserId, Profile> = self
            .ctx
            .db
            .profile_repo()
            .list_all()
            .await?
            .into_iter()
            .map(|p| (p.user_id, p))
            .collect();

        debug!(count = subscriptions.len(), "Subscriptions listed");
        Ok(subscriptions
            .into_iter()
            .map(|subscription| SubscriptionView {
                agent: agents.get(&subscription.agent_id).cloned(),
                subscriber: profiles.get(&subscription.user_id).cloned(),
                subscription,
            })
            .collect())
    }

    async fn agents_by_id(&self) -> std::result::Result<HashMap<AgentId, Agent>, DbError> {
        Ok(self
            .ctx
            .db
            .agent_repo()
            .list_all()
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect())
    }
}

fn newest_first(subscriptions: &mut [Subscription]) {
    subscriptions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

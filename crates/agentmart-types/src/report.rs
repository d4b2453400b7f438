//! Read-only report views: counts and enriched joins for dashboards

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Agent, Profile, Subscription, Transaction};

/// Marketplace-wide counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceStats {
    pub total_agents: u64,
    pub active_agents: u64,
    pub pending_agents: u64,
    pub active_subscriptions: u64,
    /// Sum over completed transactions
    pub total_revenue: Decimal,
    pub total_usage: u64,
}

/// A subscription with the agent it grants access to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionWithAgent {
    #[serde(flatten)]
    pub subscription: Subscription,
    /// `None` when the agent has since been deleted
    pub agent: Option<Agent>,
}

/// A subscription joined with its agent and subscriber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub agent: Option<Agent>,
    pub subscriber: Option<Profile>,
}

/// A transaction joined with its payer and agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub payer: Option<Profile>,
    pub agent: Option<Agent>,
}

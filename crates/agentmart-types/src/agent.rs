//! Agent listing types
//!
//! An agent is the product sold on the marketplace. Sellers list agents;
//! buyers subscribe to or purchase them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{AgentId, MarketError, Result, UserId};

/// Listing lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Visible in the public catalog
    Active,
    /// Withdrawn from the catalog
    Inactive,
    /// Submitted for review
    Pending,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an agent is priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceType {
    Free,
    OneTime,
    /// Recurring; grants expire after one billing period
    Subscription,
}

impl PriceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::OneTime => "one-time",
            Self::Subscription => "subscription",
        }
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored agent listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub description: String,
    pub capabilities: Vec<String>,
    pub status: AgentStatus,
    pub category: String,
    pub price: Decimal,
    pub price_type: PriceType,
    /// Identity of the seller that listed the agent
    pub created_by: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    pub usage_count: u64,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.created_by == *user
    }
}

/// Input for listing a new agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAgent {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    pub category: String,
    pub price: Decimal,
    pub price_type: PriceType,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub api_endpoint: Option<String>,
}

impl NewAgent {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(MarketError::invalid_input("name", "must not be empty"));
        }
        validate_price(self.price)
    }
}

/// Partial update of an agent listing. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub capabilities: Option<Vec<String>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub price_type: Option<PriceType>,
    #[serde(default)]
    pub status: Option<AgentStatus>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub api_endpoint: Option<String>,
}

impl AgentPatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(MarketError::invalid_input("name", "must not be empty"));
            }
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }

    /// Apply every present field. Does not touch `updated_at`.
    pub fn apply(&self, agent: &mut Agent) {
        if let Some(v) = &self.name {
            agent.name = v.clone();
        }
        if let Some(v) = &self.description {
            agent.description = v.clone();
        }
        if let Some(v) = &self.capabilities {
            agent.capabilities = v.clone();
        }
        if let Some(v) = &self.category {
            agent.category = v.clone();
        }
        if let Some(v) = self.price {
            agent.price = v;
        }
        if let Some(v) = self.price_type {
            agent.price_type = v;
        }
        if let Some(v) = self.status {
            agent.status = v;
        }
        if let Some(v) = &self.image_url {
            agent.image_url = Some(v.clone());
        }
        if let Some(v) = &self.api_endpoint {
            agent.api_endpoint = Some(v.clone());
        }
    }
}

/// Equality filters for the catalog listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentFilter {
    #[serde(default)]
    pub status: Option<AgentStatus>,
    #[serde(default)]
    pub category: Option<String>,
}

impl AgentFilter {
    pub fn matches(&self, agent: &Agent) -> bool {
        self.status.map_or(true, |s| agent.status == s)
            && self.category.as_ref().map_or(true, |c| agent.category == *c)
    }
}

fn validate_price(price: Decimal) -> Result<()> {
    if price < Decimal::ZERO {
        return Err(MarketError::invalid_input("price", "must not be negative"));
    }
    Ok(())
}

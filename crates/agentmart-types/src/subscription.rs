//! Subscription types
//!
//! ```text
//! [none] --create--> active --cancel--> cancelled
//! active --(external expiry)--> expired
//! ```

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AgentId, PriceType, SubscriptionId, UserId};

/// Length of one billing period for subscription-priced agents
pub const SUBSCRIPTION_PERIOD_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    /// Reserved for an external expiry process
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }
}

/// A grant of access from a user to an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub agent_id: AgentId,
    pub status: SubscriptionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_ref: Option<String>,
    pub amount: Decimal,
    pub start_date: DateTime<Utc>,
    /// Unset for free and one-time grants, which never lapse
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}

/// Input for subscribing to an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubscription {
    pub agent_id: AgentId,
    #[serde(default)]
    pub payment_ref: Option<String>,
}

/// End of the grant started at `start` for an agent priced as `price_type`
pub fn subscription_end_date(price_type: PriceType, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match price_type {
        PriceType::Subscription => Some(start + Duration::days(SUBSCRIPTION_PERIOD_DAYS)),
        PriceType::Free | PriceType::OneTime => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_subscription_priced_grant_lasts_thirty_days() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let end = subscription_end_date(PriceType::Subscription, start).unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_perpetual_grants_have_no_end() {
        let start = Utc::now();
        assert!(subscription_end_date(PriceType::Free, start).is_none());
        assert!(subscription_end_date(PriceType::OneTime, start).is_none());
    }
}

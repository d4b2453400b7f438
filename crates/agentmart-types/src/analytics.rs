//! Usage analytics types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{AgentId, EventId, UserId};

/// An append-only usage event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: EventId,
    pub agent_id: AgentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Input for recording an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackEvent {
    pub agent_id: AgentId,
    pub action: String,
    #[serde(default)]
    pub metadata: Option<String>,
}

/// Per-agent activity summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAnalytics {
    pub total: u64,
    pub last_24_hours: u64,
    pub last_week: u64,
    pub last_month: u64,
    pub by_action: BTreeMap<String, u64>,
}

/// Event count for one UTC calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Platform-wide activity for the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Exactly seven days, oldest first, zero-count days included
    pub daily: Vec<DailyCount>,
    pub total_events: u64,
    pub weekly_events: u64,
}

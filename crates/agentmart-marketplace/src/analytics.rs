//! Usage analytics
//!
//! Events are append-only. All windows count events strictly after their
//! cutoff; dashboard days are UTC calendar dates.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;
use tracing::debug;

use agentmart_policy::Operation;
use agentmart_types::{
    AgentAnalytics, AgentId, AnalyticsEvent, Caller, DailyCount, DashboardStats, EventId, Result, TrackEvent,
};

use crate::access::{gate, ownership};
use crate::Context;

/// Days covered by the dashboard histogram
pub const DASHBOARD_DAYS: i64 = 7;

pub struct AnalyticsService {
    ctx: Context,
}

impl AnalyticsService {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Record a usage event, attributed to the caller when there is one
    pub async fn track(&self, caller: Caller, input: TrackEvent) -> Result<AnalyticsEvent> {
        let subject = self.ctx.subject(caller).await?;
        gate(Operation::AnalyticsTrack, &subject)?;

        let event = self
            .ctx
            .db
            .analytics_repo()
            .record(AnalyticsEvent {
                id: EventId::new(),
                agent_id: input.agent_id,
                user_id: subject.user_id(),
                action: input.action,
                metadata: input.metadata,
                timestamp: self.ctx.now(),
            })
            .await?;
        debug!(agent_id = %event.agent_id, action = %event.action, "Event tracked");
        Ok(event)
    }

    /// Activity summary for one agent (owner or admin; `None` otherwise)
    pub async fn agent_analytics(&self, caller: Caller, agent_id: AgentId) -> Result<Option<AgentAnalytics>> {
        let subject = self.ctx.subject(caller).await?;
        if let Err(denied) = gate(Operation::AnalyticsAgent, &subject) {
            return denied.resolve(None);
        }
        let Some(agent) = self.ctx.db.agent_repo().find_by_id(agent_id).await? else {
            return Ok(None);
        };
        if let Err(denied) = ownership(Operation::AnalyticsAgent, &subject, &agent.created_by) {
            return denied.resolve(None);
        }

        let events = self.ctx.db.analytics_repo().list_by_agent(agent_id).await?;
        Ok(Some(summarize(&events, self.ctx.now())))
    }

    /// Platform-wide activity for the last week (admin only; `None` otherwise)
    pub async fn dashboard(&self, caller: Caller) -> Result<Option<DashboardStats>> {
        let subject = self.ctx.subject(caller).await?;
        if let Err(denied) = gate(Operation::AnalyticsDashboard, &subject) {
            return denied.resolve(None);
        }
        let events = self.ctx.db.analytics_repo().list_all().await?;
        Ok(Some(dashboard_stats(&events, self.ctx.now())))
    }
}

fn summarize(events: &[AnalyticsEvent], now: DateTime<Utc>) -> AgentAnalytics {
    let after = |cutoff: DateTime<Utc>| events.iter().filter(|e| e.timestamp > cutoff).count() as u64;

    let mut by_action = BTreeMap::new();
    for event in events {
        *by_action.entry(event.action.clone()).or_insert(0) += 1;
    }

    AgentAnalytics {
        total: events.len() as u64,
        last_24_hours: after(now - Duration::hours(24)),
        last_week: after(now - Duration::days(7)),
        last_month: after(now - Duration::days(30)),
        by_action,
    }
}

/// Seven buckets keyed by the UTC date of `now - i days`, oldest first.
/// An in-window event whose date has no bucket is still a weekly event but
/// lands in no bucket.
fn dashboard_stats(events: &[AnalyticsEvent], now: DateTime<Utc>) -> DashboardStats {
    let week_ago = now - Duration::days(DASHBOARD_DAYS);

    let mut buckets: BTreeMap<NaiveDate, u64> = (0..DASHBOARD_DAYS)
        .map(|i| ((now - Duration::days(i)).date_naive(), 0))
        .collect();

    let mut weekly_events = 0;
    for event in events.iter().filter(|e| e.timestamp > week_ago) {
        weekly_events += 1;
        if let Some(count) = buckets.get_mut(&event.timestamp.date_naive()) {
            *count += 1;
        }
    }

    DashboardStats {
        daily: buckets.into_iter().map(|(date, count)| DailyCount { date, count }).collect(),
        total_events: events.len() as u64,
        weekly_events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ManualClock, Marketplace};
    use agentmart_db::Database;
    use agentmart_types::{NewAgent, NewProfile, PriceType, Role, UserId};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn event_at(timestamp: DateTime<Utc>, action: &str) -> AnalyticsEvent {
        AnalyticsEvent {
            id: EventId::new(),
            agent_id: AgentId::new(),
            user_id: None,
            action: action.to_string(),
            metadata: None,
            timestamp,
        }
    }

    #[test]
    fn test_dashboard_buckets_oldest_first_with_zero_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 15, 0, 0).unwrap();
        let events = vec![
            event_at(now - Duration::hours(1), "view"),
            event_at(now - Duration::days(2), "view"),
            event_at(now - Duration::days(2) - Duration::hours(1), "use"),
            event_at(now - Duration::days(9), "view"),
        ];
        let stats = dashboard_stats(&events, now);

        assert_eq!(stats.daily.len(), 7);
        assert_eq!(stats.daily[0].date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(stats.daily[6].date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(stats.daily[6].count, 1);
        assert_eq!(stats.daily[4].count, 2);
        assert_eq!(stats.daily[0].count, 0);
        assert_eq!(stats.total_events, 4);
        assert_eq!(stats.weekly_events, 3);
    }

    #[test]
    fn test_event_on_week_boundary_day_is_weekly_but_unbucketed() {
        // Seven days back at 16:00 is inside the window, but its date is
        // one before the oldest bucket
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 15, 0, 0).unwrap();
        let events = vec![event_at(now - Duration::days(7) + Duration::hours(1), "view")];
        let stats = dashboard_stats(&events, now);
        assert_eq!(stats.weekly_events, 1);
        assert_eq!(stats.daily.iter().map(|d| d.count).sum::<u64>(), 0);
    }

    #[test]
    fn test_windows_are_strict() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        let events = vec![
            event_at(now - Duration::hours(24), "view"),
            event_at(now - Duration::hours(23), "view"),
            event_at(now - Duration::days(29), "use"),
        ];
        let summary = summarize(&events, now);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.last_24_hours, 1);
        assert_eq!(summary.last_week, 2);
        assert_eq!(summary.last_month, 3);
        assert_eq!(summary.by_action.get("view"), Some(&2));
        assert_eq!(summary.by_action.get("use"), Some(&1));
    }

    #[tokio::test]
    async fn test_agent_analytics_visibility() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()));
        let market = Marketplace::with_clock(Database::in_memory().await.unwrap(), clock.clone());
        let admin = Caller::User(UserId::new());
        let seller = Caller::User(UserId::new());
        let stranger = Caller::User(UserId::new());

        market
            .profiles()
            .create(admin, NewProfile { name: "Admin".into(), email: "a@x.io".into() })
            .await
            .unwrap();
        let seller_profile = market
            .profiles()
            .create(seller, NewProfile { name: "Seller".into(), email: "s@x.io".into() })
            .await
            .unwrap();
        market.profiles().set_role(admin, seller_profile.id, Role::Agent).await.unwrap();
        let agent = market
            .agents()
            .create(
                seller,
                NewAgent {
                    name: "Bot".into(),
                    description: "d".into(),
                    capabilities: vec![],
                    category: "c".into(),
                    price: dec!(0),
                    price_type: PriceType::Free,
                    image_url: None,
                    api_endpoint: None,
                },
            )
            .await
            .unwrap();

        let tracked = market
            .analytics()
            .track(Caller::Anonymous, TrackEvent { agent_id: agent.id, action: "view".into(), metadata: None })
            .await
            .unwrap();
        assert!(tracked.user_id.is_none());
        market
            .analytics()
            .track(stranger, TrackEvent { agent_id: agent.id, action: "use".into(), metadata: None })
            .await
            .unwrap();

        let summary = market.analytics().agent_analytics(seller, agent.id).await.unwrap().unwrap();
        assert_eq!(summary.total, 2);
        assert!(market.analytics().agent_analytics(admin, agent.id).await.unwrap().is_some());
        assert!(market.analytics().agent_analytics(stranger, agent.id).await.unwrap().is_none());
        assert!(market.analytics().agent_analytics(Caller::Anonymous, agent.id).await.unwrap().is_none());
        assert!(market.analytics().agent_analytics(admin, AgentId::new()).await.unwrap().is_none());

        assert!(market.analytics().dashboard(seller).await.unwrap().is_none());
        let dashboard = market.analytics().dashboard(admin).await.unwrap().unwrap();
        assert_eq!(dashboard.weekly_events, 2);
        assert_eq!(dashboard.daily[6].count, 2);
    }
}

//! Analytics Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use agentmart_types::{AgentAnalytics, AgentId, AnalyticsEvent, DashboardStats, TrackEvent};

use crate::error::ApiResult;
use crate::extractors::{parse_id, CallerIdentity, JsonBody};
use crate::state::AppState;

pub async fn track(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    JsonBody(input): JsonBody<TrackEvent>,
) -> ApiResult<Json<AnalyticsEvent>> {
    Ok(Json(state.market.analytics().track(caller, input).await?))
}

pub async fn agent(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(agent_id): Path<String>,
) -> ApiResult<Json<Option<AgentAnalytics>>> {
    let agent_id: AgentId = parse_id(&agent_id, "agentId")?;
    Ok(Json(state.market.analytics().agent_analytics(caller, agent_id).await?))
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
) -> ApiResult<Json<Option<DashboardStats>>> {
    Ok(Json(state.market.analytics().dashboard(caller).await?))
}

//! Subscription Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use agentmart_types::{AgentId, NewSubscription, Subscription, SubscriptionId, SubscriptionView, SubscriptionWithAgent};

use crate::error::ApiResult;
use crate::extractors::{parse_id, CallerIdentity, JsonBody};
use crate::state::AppState;

pub async fn create(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    JsonBody(input): JsonBody<NewSubscription>,
) -> ApiResult<Json<Subscription>> {
    Ok(Json(state.market.subscriptions().create(caller, input).await?))
}

pub async fn cancel(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<Subscription>> {
    let id: SubscriptionId = parse_id(&id, "subscriptionId")?;
    Ok(Json(state.market.subscriptions().cancel(caller, id).await?))
}

/// The caller's active subscription to an agent, or `null`
pub async fn check(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(agent_id): Path<String>,
) -> ApiResult<Json<Option<Subscription>>> {
    let agent_id: AgentId = parse_id(&agent_id, "agentId")?;
    Ok(Json(state.market.subscriptions().check(caller, agent_id).await?))
}

pub async fn list_mine(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
) -> ApiResult<Json<Vec<SubscriptionWithAgent>>> {
    Ok(Json(state.market.subscriptions().list_mine(caller).await?))
}

pub async fn list_all(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
) -> ApiResult<Json<Vec<SubscriptionView>>> {
    Ok(Json(state.market.subscriptions().list_all(caller).await?))
}

//! Agent Handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use agentmart_types::{Agent, AgentFilter, AgentId, AgentPatch, MarketError, MarketplaceStats, NewAgent};

use crate::dto::SuccessResponse;
use crate::error::ApiResult;
use crate::extractors::{parse_id, CallerIdentity, JsonBody};
use crate::state::AppState;

/// Catalog with optional `status` and `category` filters
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<AgentFilter>,
) -> ApiResult<Json<Vec<Agent>>> {
    Ok(Json(state.market.agents().list(filter).await?))
}

pub async fn list_public(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Agent>>> {
    Ok(Json(state.market.agents().list_public().await?))
}

pub async fn get(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Json<Agent>> {
    let id: AgentId = parse_id(&id, "agentId")?;
    let agent = state
        .market
        .agents()
        .get(id)
        .await?
        .ok_or_else(|| MarketError::not_found("Agent", id))?;
    Ok(Json(agent))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    JsonBody(input): JsonBody<NewAgent>,
) -> ApiResult<Json<Agent>> {
    Ok(Json(state.market.agents().create(caller, input).await?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<AgentPatch>,
) -> ApiResult<Json<Agent>> {
    let id: AgentId = parse_id(&id, "agentId")?;
    Ok(Json(state.market.agents().update(caller, id, patch).await?))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    let id: AgentId = parse_id(&id, "agentId")?;
    state.market.agents().remove(caller, id).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn increment_usage(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Json<Agent>> {
    let id: AgentId = parse_id(&id, "agentId")?;
    Ok(Json(state.market.agents().increment_usage(id).await?))
}

pub async fn categories(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.market.agents().categories().await?))
}

/// Admin counters, `null` for everyone else
pub async fn stats(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
) -> ApiResult<Json<Option<MarketplaceStats>>> {
    Ok(Json(state.market.agents().stats(caller).await?))
}

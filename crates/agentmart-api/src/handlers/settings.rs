//! Settings Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use agentmart_types::Setting;

use crate::dto::SettingValueRequest;
use crate::error::ApiResult;
use crate::extractors::{CallerIdentity, JsonBody};
use crate::state::AppState;

pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Setting>>> {
    Ok(Json(state.market.settings().list().await?))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<Json<Option<Setting>>> {
    Ok(Json(state.market.settings().get(&key).await?))
}

pub async fn set(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(key): Path<String>,
    JsonBody(request): JsonBody<SettingValueRequest>,
) -> ApiResult<Json<Setting>> {
    Ok(Json(state.market.settings().set(caller, &key, request.value).await?))
}

//! Profile Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use agentmart_types::{NewProfile, Profile, ProfileId, ProfileUpdate, UserId};

use crate::dto::SetRoleRequest;
use crate::error::ApiResult;
use crate::extractors::{parse_id, CallerIdentity, JsonBody};
use crate::state::AppState;

/// The caller's profile, `null` before first-time setup
pub async fn get_own(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
) -> ApiResult<Json<Option<Profile>>> {
    Ok(Json(state.market.profiles().get_own(caller).await?))
}

pub async fn get_by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Option<Profile>>> {
    let user_id: UserId = parse_id(&user_id, "userId")?;
    Ok(Json(state.market.profiles().get_by_user(user_id).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    JsonBody(input): JsonBody<NewProfile>,
) -> ApiResult<Json<Profile>> {
    Ok(Json(state.market.profiles().create(caller, input).await?))
}

pub async fn update_own(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    JsonBody(update): JsonBody<ProfileUpdate>,
) -> ApiResult<Json<Profile>> {
    Ok(Json(state.market.profiles().update_own(caller, update).await?))
}

pub async fn set_role(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(profile_id): Path<String>,
    JsonBody(request): JsonBody<SetRoleRequest>,
) -> ApiResult<Json<Profile>> {
    let profile_id: ProfileId = parse_id(&profile_id, "profileId")?;
    Ok(Json(state.market.profiles().set_role(caller, profile_id, request.role).await?))
}

pub async fn list_all(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
) -> ApiResult<Json<Vec<Profile>>> {
    Ok(Json(state.market.profiles().list_all(caller).await?))
}

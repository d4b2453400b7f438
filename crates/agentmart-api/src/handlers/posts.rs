//! Post Handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use agentmart_types::{MarketError, NewPost, Post, PostFilter, PostId, PostPatch};

use crate::dto::SuccessResponse;
use crate::error::ApiResult;
use crate::extractors::{parse_id, CallerIdentity, JsonBody};
use crate::state::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<PostFilter>,
) -> ApiResult<Json<Vec<Post>>> {
    Ok(Json(state.market.posts().list(filter).await?))
}

pub async fn list_public(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Post>>> {
    Ok(Json(state.market.posts().list_public().await?))
}

pub async fn get(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Json<Post>> {
    let id: PostId = parse_id(&id, "postId")?;
    let post = state
        .market
        .posts()
        .get(id)
        .await?
        .ok_or_else(|| MarketError::not_found("Post", id))?;
    Ok(Json(post))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    JsonBody(input): JsonBody<NewPost>,
) -> ApiResult<Json<Post>> {
    Ok(Json(state.market.posts().create(caller, input).await?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<PostPatch>,
) -> ApiResult<Json<Post>> {
    let id: PostId = parse_id(&id, "postId")?;
    Ok(Json(state.market.posts().update(caller, id, patch).await?))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    let id: PostId = parse_id(&id, "postId")?;
    state.market.posts().remove(caller, id).await?;
    Ok(Json(SuccessResponse::ok()))
}

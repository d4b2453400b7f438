//! Authentication Handlers
//!
//! Sign-up, sign-in (password or anonymous) and sign-out. Profiles are
//! created separately through the profiles endpoints.

use axum::{extract::State, Json};
use std::sync::Arc;

use agentmart_auth::Session;

use crate::dto::{CredentialsRequest, SuccessResponse};
use crate::error::ApiResult;
use crate::extractors::{BearerToken, JsonBody};
use crate::state::AppState;

pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<CredentialsRequest>,
) -> ApiResult<Json<Session>> {
    let session = state.auth.sign_up(&request.email, &request.password).await?;
    Ok(Json(session))
}

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<CredentialsRequest>,
) -> ApiResult<Json<Session>> {
    let session = state
        .auth
        .sign_in(&request.email, &request.password)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Sign-in failed");
            e
        })?;
    Ok(Json(session))
}

pub async fn sign_in_anonymous(State(state): State<Arc<AppState>>) -> ApiResult<Json<Session>> {
    Ok(Json(state.auth.sign_in_anonymous()?))
}

pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<SuccessResponse>> {
    state.auth.sign_out(&token).await?;
    Ok(Json(SuccessResponse::with_message("Signed out")))
}

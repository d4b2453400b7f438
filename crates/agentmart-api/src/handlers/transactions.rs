//! Transaction Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use agentmart_types::{NewTransaction, Transaction, TransactionId, TransactionView};

use crate::dto::UpdateStatusRequest;
use crate::error::ApiResult;
use crate::extractors::{parse_id, CallerIdentity, JsonBody};
use crate::state::AppState;

pub async fn create(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    JsonBody(input): JsonBody<NewTransaction>,
) -> ApiResult<Json<Transaction>> {
    Ok(Json(state.market.transactions().create(caller, input).await?))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateStatusRequest>,
) -> ApiResult<Json<Transaction>> {
    let id: TransactionId = parse_id(&id, "transactionId")?;
    Ok(Json(state.market.transactions().update_status(caller, id, request.status).await?))
}

pub async fn list_mine(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
) -> ApiResult<Json<Vec<Transaction>>> {
    Ok(Json(state.market.transactions().list_mine(caller).await?))
}

pub async fn list_all(
    State(state): State<Arc<AppState>>,
    CallerIdentity(caller): CallerIdentity,
) -> ApiResult<Json<Vec<TransactionView>>> {
    Ok(Json(state.market.transactions().list_all(caller).await?))
}

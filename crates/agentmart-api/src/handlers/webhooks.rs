//! Payment provider webhook
//!
//! The body is read raw so the signature is checked over the exact bytes
//! the provider signed, before any JSON parsing.

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use agentmart_auth::SIGNATURE_HEADER;
use agentmart_types::{PaymentEvent, Transaction};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn payment_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Vec<Transaction>>> {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    state.auth.verify_webhook(signature, &body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected payment webhook");
        e
    })?;

    let event: PaymentEvent = serde_json::from_slice(&body)?;
    Ok(Json(state.market.transactions().apply_payment_event(event).await?))
}

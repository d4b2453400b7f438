//! Custom Axum Extractors
//!
//! Identity resolution, path ids and JSON bodies with API-shaped rejections.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;
use std::str::FromStr;
use std::sync::Arc;

use agentmart_auth::{bearer_token, AuthError, IdentityResolver};
use agentmart_types::Caller;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Caller Extractor
// =============================================================================

/// The resolved identity of the request.
///
/// No `Authorization` header resolves to [`Caller::Anonymous`]. A header that
/// is present but unusable is rejected with 401.
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity(pub Caller);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CallerIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let token = raw_bearer(parts)?;
        let caller = state.auth.resolve(token.as_deref()).await?;
        Ok(CallerIdentity(caller))
    }
}

/// The raw bearer token, required (sign-out)
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        raw_bearer(parts)?
            .map(BearerToken)
            .ok_or(ApiError::Auth(AuthError::InvalidToken))
    }
}

fn raw_bearer(parts: &Parts) -> Result<Option<String>, ApiError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthError::InvalidToken)?;
    let token = bearer_token(value).ok_or(AuthError::InvalidToken)?;
    Ok(Some(token.to_string()))
}

// =============================================================================
// JSON Body Extractor
// =============================================================================

/// `Json<T>` whose rejection is an [`ApiError`]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a path segment into a typed id (prefixed or bare UUID)
pub fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::InvalidParameter(format!("{what}: malformed id '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentmart_types::AgentId;

    #[test]
    fn test_parse_id_accepts_both_forms() {
        let id = AgentId::new();
        assert_eq!(parse_id::<AgentId>(&id.to_string(), "agent").unwrap(), id);
        assert_eq!(parse_id::<AgentId>(&id.0.to_string(), "agent").unwrap(), id);
        assert!(matches!(
            parse_id::<AgentId>("nope", "agent"),
            Err(ApiError::InvalidParameter(_))
        ));
    }
}

//! Identity resolution
//!
//! Turns the bearer credential of a request into a [`Caller`]. A missing
//! credential is anonymity, not an error; a present but bad one is an error.

use async_trait::async_trait;

use agentmart_types::Caller;

use crate::error::{AuthError, AuthResult};
use crate::jwt::JwtService;

/// The identity provider seen by the API layer
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, bearer: Option<&str>) -> AuthResult<Caller>;
}

#[async_trait]
impl IdentityResolver for JwtService {
    async fn resolve(&self, bearer: Option<&str>) -> AuthResult<Caller> {
        let Some(token) = bearer else {
            return Ok(Caller::Anonymous);
        };
        let claims = self.validate(token).await?;
        let user_id = claims.user_id().ok_or(AuthError::InvalidToken)?;
        Ok(Caller::User(user_id))
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim())
    } else {
        None
    }
}

//! JWT Token Service
//!
//! Issues and validates HS256 access tokens. Sign-out revokes a token by its
//! `jti` until the token would have expired anyway.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use agentmart_types::UserId;

use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};
use crate::types::{AccessToken, TokenClaims};

/// JWT service for token management
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Revoked token ids mapped to their expiry
    revoked_tokens: Arc<RwLock<HashMap<String, i64>>>,
}

impl JwtService {
    /// Create a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
            revoked_tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Issue an access token for `user_id`
    pub fn issue(&self, user_id: UserId, anonymous: bool) -> AuthResult<AccessToken> {
        let now = Utc::now();
        let exp = now
            + Duration::from_std(self.config.token_lifetime).map_err(|e| AuthError::Internal(e.to_string()))?;

        let claims = TokenClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
            anonymous,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to encode access token: {}", e)))?;

        Ok(AccessToken::new(token, exp.timestamp()))
    }

    /// Validate an access token and return its claims
    pub async fn validate(&self, token: &str) -> AuthResult<TokenClaims> {
        let claims = self.decode_token(token)?;
        if self.is_revoked(&claims.jti).await {
            return Err(AuthError::TokenRevoked);
        }
        Ok(claims)
    }

    /// Revoke a token until its natural expiry. Revocations of tokens that
    /// have since expired are dropped on the way, so the set stays bounded
    /// by the tokens still alive.
    pub async fn revoke(&self, claims: &TokenClaims) {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked_tokens.write().await;
        let before = revoked.len();
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(claims.jti.clone(), claims.exp);
        tracing::debug!(
            jti = %claims.jti,
            pruned = before + 1 - revoked.len(),
            "Token revoked"
        );
    }

    pub async fn is_revoked(&self, jti: &str) -> bool {
        self.revoked_tokens.read().await.contains_key(jti)
    }

    fn decode_token(&self, token: &str) -> AuthResult<TokenClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}

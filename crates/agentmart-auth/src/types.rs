//! Core authentication types

use serde::{Deserialize, Serialize};

use agentmart_types::UserId;

/// JWT claims carried by every access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the caller identity, as `user_<uuid>`
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Not before (unix seconds)
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
    /// Token id, used for revocation
    pub jti: String,
    /// Issued by guest sign-in
    #[serde(default)]
    pub anonymous: bool,
}

impl TokenClaims {
    pub fn user_id(&self) -> Option<UserId> {
        UserId::parse(&self.sub).ok()
    }
}

/// How an identity was established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    Password,
    Anonymous,
}

/// Token handed to a client after sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Expiry (unix seconds)
    pub expires_at: i64,
}

impl AccessToken {
    pub fn new(access_token: String, expires_at: i64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_at,
        }
    }
}

/// Result of a successful sign-up or sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub method: AuthMethod,
    #[serde(flatten)]
    pub token: AccessToken,
}

//! AgentMart Authentication Layer
//!
//! The identity provider for the marketplace:
//!
//! - **JWT**: HS256 access tokens, revocable on sign-out
//! - **Passwords**: email/password sign-up and sign-in, Argon2id hashes
//!   stored in the marketplace database
//! - **Anonymous**: guest identities issued without credentials
//! - **Webhooks**: HMAC-SHA256 verification of settlement callbacks
//!
//! ```text
//! Authorization: Bearer <jwt> ──▶ IdentityResolver ──▶ Caller::User(id)
//! (no header)                 ──▶ IdentityResolver ──▶ Caller::Anonymous
//! ```
//!
//! Roles are not part of the identity; they live on the marketplace profile.

pub mod config;
pub mod credentials;
pub mod error;
pub mod jwt;
pub mod password;
pub mod resolver;
pub mod types;
pub mod webhook;

pub use config::{AuthConfig, JwtConfig, PasswordConfig, WebhookConfig};
pub use credentials::CredentialStore;
pub use error::{AuthError, AuthResult};
pub use jwt::JwtService;
pub use password::PasswordService;
pub use resolver::{bearer_token, IdentityResolver};
pub use types::*;
pub use webhook::{WebhookVerifier, SIGNATURE_HEADER};

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use agentmart_db::Database;
use agentmart_types::{Caller, UserId};

/// Authentication service combining every sign-in method
#[derive(Clone)]
pub struct AuthService {
    pub jwt: JwtService,
    credentials: Arc<CredentialStore>,
    webhook: Option<WebhookVerifier>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(db: Database, config: AuthConfig) -> Self {
        let jwt = JwtService::new(config.jwt.clone());
        let credentials = Arc::new(CredentialStore::new(
            db,
            PasswordService::new(config.password.clone()),
        ));
        let webhook = WebhookVerifier::from_config(&config.webhook);
        Self {
            jwt,
            credentials,
            webhook,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Register email/password credentials and sign in
    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<Session> {
        let user_id = self.credentials.register(email, password).await?;
        info!(user_id = %user_id, "Identity registered");
        self.session(user_id, AuthMethod::Password)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let user_id = self.credentials.authenticate(email, password).await?;
        self.session(user_id, AuthMethod::Password)
    }

    /// Issue a fresh guest identity
    pub fn sign_in_anonymous(&self) -> AuthResult<Session> {
        if !self.config.allow_anonymous {
            return Err(AuthError::AnonymousDisabled);
        }
        let user_id = UserId::new();
        info!(user_id = %user_id, "Anonymous identity issued");
        self.session(user_id, AuthMethod::Anonymous)
    }

    /// Revoke the presented token
    pub async fn sign_out(&self, token: &str) -> AuthResult<()> {
        let claims = self.jwt.validate(token).await?;
        self.jwt.revoke(&claims).await;
        Ok(())
    }

    /// Verify a settlement webhook signature header against the raw body
    pub fn verify_webhook(&self, header: Option<&str>, body: &[u8]) -> AuthResult<()> {
        let verifier = self.webhook.as_ref().ok_or(AuthError::WebhookDisabled)?;
        verifier.verify(header.ok_or(AuthError::InvalidSignature)?, body)
    }

    fn session(&self, user_id: UserId, method: AuthMethod) -> AuthResult<Session> {
        let token = self.jwt.issue(user_id, method == AuthMethod::Anonymous)?;
        Ok(Session { user_id, method, token })
    }
}

#[async_trait]
impl IdentityResolver for AuthService {
    async fn resolve(&self, bearer: Option<&str>) -> AuthResult<Caller> {
        self.jwt.resolve(bearer).await
    }
}

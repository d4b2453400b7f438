//! Email/password credential store
//!
//! Maps a normalized email to the identity it signs in as. Rows live in the
//! `credentials` table next to the marketplace data, so an identity keeps
//! its id (and therefore its profile) across restarts.

use chrono::Utc;
use tracing::debug;

use agentmart_db::Database;
use agentmart_types::UserId;

use crate::error::{AuthError, AuthResult};
use crate::password::PasswordService;

/// Registered email/password pairs
pub struct CredentialStore {
    passwords: PasswordService,
    db: Database,
}

impl CredentialStore {
    pub fn new(db: Database, passwords: PasswordService) -> Self {
        Self { passwords, db }
    }

    /// Register a new identity. Fails if the email is already registered.
    pub async fn register(&self, email: &str, password: &str) -> AuthResult<UserId> {
        let email = normalize_email(email)?;
        let password_hash = self.passwords.hash_password(password)?;

        // The primary key on email decides a sign-up race
        let user_id = UserId::new();
        self.db
            .credential_repo()
            .create(&email, user_id, &password_hash, Utc::now())
            .await?;
        debug!(user_id = %user_id, "Credential stored");
        Ok(user_id)
    }

    /// Check an email/password pair and return the identity
    pub async fn authenticate(&self, email: &str, password: &str) -> AuthResult<UserId> {
        let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;
        let credential = self
            .db
            .credential_repo()
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if self.passwords.verify_password(password, &credential.password_hash)? {
            Ok(UserId::from_uuid(credential.user_id))
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

fn normalize_email(email: &str) -> AuthResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AuthError::InvalidEmail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PasswordConfig;

    async fn store() -> CredentialStore {
        let db = Database::in_memory().await.unwrap();
        CredentialStore::new(
            db,
            PasswordService::new(PasswordConfig {
                memory_cost: 1024,
                time_cost: 1,
                ..PasswordConfig::default()
            }),
        )
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let store = store().await;
        let id = store.register("Alice@Example.com", "long enough").await.unwrap();
        assert_eq!(store.authenticate("alice@example.com ", "long enough").await.unwrap(), id);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let store = store().await;
        store.register("a@x.io", "long enough").await.unwrap();
        let err = store.register("A@X.io", "other pass").await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let store = store().await;
        store.register("a@x.io", "long enough").await.unwrap();
        let wrong = store.authenticate("a@x.io", "not the one").await.unwrap_err();
        let unknown = store.authenticate("b@x.io", "long enough").await.unwrap_err();
        assert_eq!(wrong.error_code(), unknown.error_code());
    }

    #[tokio::test]
    async fn test_invalid_email() {
        let err = store().await.register("nope", "long enough").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail));
    }
}

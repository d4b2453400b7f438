//! Authentication error types
//!
//! Errors are safe to show to clients except the internal ones, which
//! [`AuthError::client_message`] masks.

use agentmart_db::DbError;
use thiserror::Error;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    // =========================================================================
    // Token Errors
    // =========================================================================
    /// Token has expired
    #[error("Token has expired")]
    TokenExpired,

    /// Token is invalid (malformed, wrong signature, etc.)
    #[error("Invalid token")]
    InvalidToken,

    /// Token has been revoked by sign-out
    #[error("Token has been revoked")]
    TokenRevoked,

    // =========================================================================
    // Credential Errors
    // =========================================================================
    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Sign-up with an email that already has credentials
    #[error("Email already registered")]
    EmailTaken,

    /// Password does not meet requirements
    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    /// Email is syntactically unusable
    #[error("Invalid email address")]
    InvalidEmail,

    /// Password hashing failed
    #[error("Password hashing failed")]
    PasswordHashingFailed,

    /// Guest sign-in is switched off
    #[error("Anonymous sign-in is disabled")]
    AnonymousDisabled,

    // =========================================================================
    // Webhook Errors
    // =========================================================================
    /// Missing or wrong webhook signature
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signed timestamp outside the tolerance window
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// No webhook secret configured
    #[error("Webhooks are not configured")]
    WebhookDisabled,

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Cryptographic operation failed
    #[error("Cryptographic error")]
    CryptoError,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential storage failed
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error (should not be exposed to clients)
    #[error("Internal error")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::WeakPassword(_) | Self::InvalidEmail | Self::InvalidTimestamp => 400,

            // 401 Unauthorized
            Self::TokenExpired
            | Self::InvalidToken
            | Self::TokenRevoked
            | Self::InvalidCredentials
            | Self::InvalidSignature => 401,

            // 403 Forbidden
            Self::AnonymousDisabled => 403,

            // 409 Conflict
            Self::EmailTaken => 409,

            // 503 Service Unavailable
            Self::WebhookDisabled => 503,

            // 500 Internal Server Error
            Self::PasswordHashingFailed
            | Self::CryptoError
            | Self::Config(_)
            | Self::Database(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Get an error code for the client (safe to expose)
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::AnonymousDisabled => "ANONYMOUS_DISABLED",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::InvalidTimestamp => "INVALID_TIMESTAMP",
            Self::WebhookDisabled => "WEBHOOK_DISABLED",
            Self::PasswordHashingFailed
            | Self::CryptoError
            | Self::Config(_)
            | Self::Database(_)
            | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Get safe message for client (doesn't leak internal details)
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(_) | Self::Config(_) | Self::Database(_) => {
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            _ => Self::InvalidToken,
        }
    }
}

impl From<DbError> for AuthError {
    fn from(err: DbError) -> Self {
        if err.is_duplicate_on("credentials_email_key") {
            return Self::EmailTaken;
        }
        Self::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::InvalidToken.status_code(), 401);
        assert_eq!(AuthError::EmailTaken.status_code(), 409);
        assert_eq!(AuthError::WeakPassword("short".into()).status_code(), 400);
        assert!(AuthError::Internal("x".into()).is_server_error());
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AuthError::Internal("db password=hunter2".into());
        assert!(!err.client_message().contains("hunter2"));
        assert_eq!(err.error_code(), "INTERNAL_ERROR");

        let err = AuthError::Database("sqlite:///var/lib/mart.db locked".into());
        assert_eq!(err.status_code(), 500);
        assert!(!err.client_message().contains("mart.db"));
    }
}

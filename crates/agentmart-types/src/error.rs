//! Error types for AgentMart
//!
//! Mutations fail with one of these; soft reads never surface them.

use thiserror::Error;

/// Result type for AgentMart operations
pub type Result<T> = std::result::Result<T, MarketError>;

/// AgentMart error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    // ========================================================================
    // Identity Errors
    // ========================================================================

    /// No caller identity for an operation that requires one
    #[error("Not authenticated")]
    Unauthenticated,

    // ========================================================================
    // Authorization Errors
    // ========================================================================

    /// Caller resolved but lacks the role or ownership the operation needs.
    /// The reason distinguishes role-gate failures from ownership-gate ones.
    #[error("{reason}")]
    Forbidden { reason: String },

    // ========================================================================
    // Lookup Errors
    // ========================================================================

    /// Referenced entity does not exist
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    // ========================================================================
    // State Errors
    // ========================================================================

    /// An active subscription already exists for this (user, agent) pair
    #[error("Already subscribed")]
    AlreadySubscribed,

    /// The change would leave the platform without an admin
    #[error("Cannot demote the last remaining admin")]
    LastAdmin,

    // ========================================================================
    // General Errors
    // ========================================================================

    /// Invalid input
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    /// Store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl MarketError {
    /// Create a forbidden error carrying the gate's message
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get an error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadySubscribed => "ALREADY_SUBSCRIBED",
            Self::LastAdmin => "LAST_ADMIN",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::AlreadySubscribed | Self::LastAdmin => 409,
            Self::InvalidInput { .. } => 400,
            Self::Storage(_) | Self::Internal { .. } => 500,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }
}

//! API error handling
//!
//! Every failure leaves the API as a JSON [`ErrorResponse`] carrying a stable
//! string code. Marketplace and identity errors keep their own codes and
//! status mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use agentmart_auth::AuthError;
use agentmart_types::MarketError;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Domain Errors
    // =========================================================================
    #[error(transparent)]
    Market(#[from] MarketError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    // =========================================================================
    // Request Errors
    // =========================================================================
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Market(e) => e.error_code(),
            Self::Auth(e) => e.error_code(),
            Self::InvalidParameter(_) => "INVALID_PARAMETER",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            Self::Market(e) => e.status_code(),
            Self::Auth(e) => e.status_code(),
            Self::InvalidParameter(_) | Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Message safe to return to the client
    fn client_message(&self) -> String {
        match self {
            Self::Auth(e) => e.client_message(),
            Self::Market(MarketError::Storage(_) | MarketError::Internal { .. }) => {
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// API error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub msg: String,
    /// Request ID for tracking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            code: err.error_code().to_string(),
            msg: err.client_message(),
            request_id: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(err.to_string())
    }
}

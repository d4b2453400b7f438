//! API Handlers
//!
//! Request handlers for all API endpoints, one module per domain. Handlers
//! resolve the caller and path ids, then delegate to the marketplace.

pub mod agents;
pub mod analytics;
pub mod auth;
pub mod health;
pub mod posts;
pub mod profiles;
pub mod settings;
pub mod subscriptions;
pub mod transactions;
pub mod webhooks;

pub use health::*;

use axum::http::Uri;

use crate::error::ApiError;

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {}", uri.path()))
}

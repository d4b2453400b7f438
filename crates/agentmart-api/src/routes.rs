//! API Routes
//!
//! Route definitions for all API endpoints.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// Create API v1 routes
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/profiles", profile_routes())
        .nest("/agents", agent_routes())
        .nest("/posts", post_routes())
        .nest("/subscriptions", subscription_routes())
        .nest("/transactions", transaction_routes())
        .nest("/analytics", analytics_routes())
        .nest("/settings", settings_routes())
        .route("/webhooks/payments", post(handlers::webhooks::payment_event))
}

fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/anonymous", post(handlers::auth::sign_in_anonymous))
        .route("/sign-up", post(handlers::auth::sign_up))
        .route("/sign-in", post(handlers::auth::sign_in))
        .route("/sign-out", post(handlers::auth::sign_out))
}

fn profile_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::profiles::list_all).post(handlers::profiles::create))
        .route("/me", get(handlers::profiles::get_own).patch(handlers::profiles::update_own))
        .route("/by-user/:user_id", get(handlers::profiles::get_by_user))
        .route("/:profile_id/role", put(handlers::profiles::set_role))
}

fn agent_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::agents::list).post(handlers::agents::create))
        .route("/public", get(handlers::agents::list_public))
        .route("/categories", get(handlers::agents::categories))
        .route("/stats", get(handlers::agents::stats))
        .route(
            "/:id",
            get(handlers::agents::get)
                .patch(handlers::agents::update)
                .delete(handlers::agents::remove),
        )
        .route("/:id/usage", post(handlers::agents::increment_usage))
}

fn post_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::posts::list).post(handlers::posts::create))
        .route("/public", get(handlers::posts::list_public))
        .route(
            "/:id",
            get(handlers::posts::get)
                .patch(handlers::posts::update)
                .delete(handlers::posts::remove),
        )
}

fn subscription_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::subscriptions::list_all).post(handlers::subscriptions::create))
        .route("/mine", get(handlers::subscriptions::list_mine))
        .route("/check/:agent_id", get(handlers::subscriptions::check))
        .route("/:id", delete(handlers::subscriptions::cancel))
}

fn transaction_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::transactions::list_all).post(handlers::transactions::create))
        .route("/mine", get(handlers::transactions::list_mine))
        .route("/:id/status", patch(handlers::transactions::update_status))
}

fn analytics_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", post(handlers::analytics::track))
        .route("/agents/:agent_id", get(handlers::analytics::agent))
        .route("/dashboard", get(handlers::analytics::dashboard))
}

fn settings_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::settings::list))
        .route("/:key", get(handlers::settings::get).put(handlers::settings::set))
}

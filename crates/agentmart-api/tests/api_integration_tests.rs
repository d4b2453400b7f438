//! API Integration Tests
//!
//! Drive the full router against an in-memory database and verify the
//! request/response cycle.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use agentmart_api::{create_test_router, AppState};
use agentmart_auth::{AuthConfig, WebhookVerifier, SIGNATURE_HEADER};

const WEBHOOK_SECRET: &str = "whsec_integration_test_secret";

async fn test_router() -> Router {
    let mut config = AuthConfig::default();
    config.jwt.secret = "integration-test-secret-at-least-32-bytes".to_string();
    config.password.memory_cost = 1024;
    config.password.time_cost = 1;
    config.webhook.secret = Some(WEBHOOK_SECRET.to_string());
    config.allow_anonymous = true;
    create_test_router(Arc::new(AppState::in_memory(config).await.unwrap()))
}

/// Make a request and get the status plus JSON body
async fn json_request(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        request = request.header("Authorization", format!("Bearer {token}"));
    }

    let body = match body {
        Some(json_body) => Body::from(serde_json::to_vec(&json_body).unwrap()),
        None => Body::empty(),
    };

    let response = router.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!(null));
    (status, json)
}

/// Anonymous sign-in, returning the access token
async fn guest(router: &Router) -> String {
    let (status, session) = json_request(router, "POST", "/api/v1/auth/anonymous", None, None).await;
    assert_eq!(status, StatusCode::OK);
    session["access_token"].as_str().unwrap().to_string()
}

async fn with_profile(router: &Router, name: &str) -> (String, Value) {
    let token = guest(router).await;
    let (status, profile) = json_request(
        router,
        "POST",
        "/api/v1/profiles",
        Some(&token),
        Some(json!({ "name": name, "email": format!("{name}@example.com") })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (token, profile)
}

fn agent_body() -> Value {
    json!({
        "name": "Bot",
        "description": "Answers questions",
        "category": "assistants",
        "price": "10",
        "price_type": "subscription"
    })
}

// =============================================================================
// Public Endpoint Tests
// =============================================================================

mod public_endpoints {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let router = test_router().await;
        let (status, json) = json_request(&router, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");

        let (status, json) = json_request(&router, "GET", "/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["store"]["profiles"], 0);
    }

    #[tokio::test]
    async fn test_catalog_is_public() {
        let router = test_router().await;
        let (status, json) = json_request(&router, "GET", "/api/v1/agents", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!([]));

        let (status, _) = json_request(&router, "GET", "/api/v1/agents/categories", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let router = test_router().await;
        let (status, json) = json_request(&router, "GET", "/api/v1/agents/not-an-id", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_PARAMETER");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let router = test_router().await;
        let (status, json) = json_request(&router, "GET", "/api/v1/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "NOT_FOUND");
    }
}

// =============================================================================
// Identity Tests
// =============================================================================

mod identity {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_is_anonymous() {
        let router = test_router().await;
        let (status, json) = json_request(&router, "POST", "/api/v1/agents", None, Some(agent_body())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "UNAUTHENTICATED");

        // Soft reads answer empty instead
        let (status, json) = json_request(&router, "GET", "/api/v1/profiles/me", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, Value::Null);
    }

    #[tokio::test]
    async fn test_bad_token_is_rejected() {
        let router = test_router().await;
        let (status, json) = json_request(&router, "GET", "/api/v1/profiles/me", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_sign_up_sign_in_and_out() {
        let router = test_router().await;
        let credentials = json!({ "email": "ada@example.com", "password": "correct horse battery" });

        let (status, signed_up) =
            json_request(&router, "POST", "/api/v1/auth/sign-up", None, Some(credentials.clone())).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = json_request(&router, "POST", "/api/v1/auth/sign-up", None, Some(credentials.clone())).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, signed_in) =
            json_request(&router, "POST", "/api/v1/auth/sign-in", None, Some(credentials)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(signed_in["user_id"], signed_up["user_id"]);

        let token = signed_in["access_token"].as_str().unwrap();
        let (status, _) = json_request(&router, "POST", "/api/v1/auth/sign-out", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, json) = json_request(&router, "GET", "/api/v1/profiles/me", Some(token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "TOKEN_REVOKED");
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let router = test_router().await;
        json_request(
            &router,
            "POST",
            "/api/v1/auth/sign-up",
            None,
            Some(json!({ "email": "bob@example.com", "password": "long enough pw" })),
        )
        .await;
        let (status, json) = json_request(
            &router,
            "POST",
            "/api/v1/auth/sign-in",
            None,
            Some(json!({ "email": "bob@example.com", "password": "wrong password" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "INVALID_CREDENTIALS");
    }
}

// =============================================================================
// Marketplace Flow Tests
// =============================================================================

mod marketplace {
    use super::*;

    #[tokio::test]
    async fn test_first_profile_is_admin() {
        let router = test_router().await;
        let (_, first) = with_profile(&router, "alice").await;
        let (_, second) = with_profile(&router, "bob").await;
        assert_eq!(first["role"], "admin");
        assert_eq!(second["role"], "user");
    }

    #[tokio::test]
    async fn test_subscribe_flow() {
        let router = test_router().await;
        let (admin, _) = with_profile(&router, "admin").await;
        let (user, _) = with_profile(&router, "user").await;

        let (status, agent) = json_request(&router, "POST", "/api/v1/agents", Some(&admin), Some(agent_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(agent["status"], "active");

        let subscribe = json!({ "agent_id": agent["id"] });
        let (status, sub) =
            json_request(&router, "POST", "/api/v1/subscriptions", Some(&user), Some(subscribe.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sub["status"], "active");
        assert!(sub["end_date"].is_string());

        let (status, json) =
            json_request(&router, "POST", "/api/v1/subscriptions", Some(&user), Some(subscribe)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["msg"], "Already subscribed");

        let uri = format!("/api/v1/subscriptions/check/{}", agent["id"].as_str().unwrap());
        let (_, active) = json_request(&router, "GET", &uri, Some(&user), None).await;
        assert_eq!(active["id"], sub["id"]);

        let uri = format!("/api/v1/subscriptions/{}", sub["id"].as_str().unwrap());
        let (status, json) = json_request(&router, "DELETE", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["msg"], "Not authorized");
        let (status, cancelled) = json_request(&router, "DELETE", &uri, Some(&user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cancelled["status"], "cancelled");
    }

    #[tokio::test]
    async fn test_stats_are_null_for_non_admin() {
        let router = test_router().await;
        let (admin, _) = with_profile(&router, "admin").await;
        let (user, _) = with_profile(&router, "user").await;

        let (status, json) = json_request(&router, "GET", "/api/v1/agents/stats", Some(&user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, Value::Null);

        let (_, json) = json_request(&router, "GET", "/api/v1/agents/stats", Some(&admin), None).await;
        assert_eq!(json["total_agents"], 0);
    }

    #[tokio::test]
    async fn test_role_gate_message() {
        let router = test_router().await;
        with_profile(&router, "admin").await;
        let (user, _) = with_profile(&router, "user").await;

        let (status, json) = json_request(&router, "POST", "/api/v1/agents", Some(&user), Some(agent_body())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["code"], "FORBIDDEN");
        assert_eq!(json["msg"], "Only admins and agents can create agents");
    }

    #[tokio::test]
    async fn test_promoted_seller_listing_is_pending() {
        let router = test_router().await;
        let (admin, _) = with_profile(&router, "admin").await;
        let (seller, seller_profile) = with_profile(&router, "seller").await;

        let uri = format!("/api/v1/profiles/{}/role", seller_profile["id"].as_str().unwrap());
        let (status, promoted) = json_request(&router, "PUT", &uri, Some(&admin), Some(json!({ "role": "agent" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(promoted["role"], "agent");

        let (_, agent) = json_request(&router, "POST", "/api/v1/agents", Some(&seller), Some(agent_body())).await;
        assert_eq!(agent["status"], "pending");
        let (_, public) = json_request(&router, "GET", "/api/v1/agents/public", None, None).await;
        assert_eq!(public, json!([]));
    }

    #[tokio::test]
    async fn test_settings_roundtrip() {
        let router = test_router().await;
        let (admin, _) = with_profile(&router, "admin").await;
        let (status, _) = json_request(
            &router,
            "PUT",
            "/api/v1/settings/site.banner",
            Some(&admin),
            Some(json!({ "value": "Welcome" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, setting) = json_request(&router, "GET", "/api/v1/settings/site.banner", None, None).await;
        assert_eq!(setting["value"], "Welcome");
    }
}

// =============================================================================
// Settlement Webhook Tests
// =============================================================================

mod webhooks {
    use super::*;

    async fn signed_post(router: &Router, body: &[u8], signature: Option<String>) -> StatusCode {
        let mut request = Request::builder()
            .method("POST")
            .uri("/api/v1/webhooks/payments")
            .header("Content-Type", "application/json");
        if let Some(signature) = signature {
            request = request.header(SIGNATURE_HEADER, signature);
        }
        let response = router
            .clone()
            .oneshot(request.body(Body::from(body.to_vec())).unwrap())
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn test_signed_event_settles_transaction() {
        let router = test_router().await;
        let (user, _) = with_profile(&router, "payer").await;
        let (status, tx) = json_request(
            &router,
            "POST",
            "/api/v1/transactions",
            Some(&user),
            Some(json!({
                "amount": "10",
                "currency": "USD",
                "payment_method": "card",
                "external_payment_ref": "pi_42",
                "description": "Bot monthly"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tx["status"], "pending");

        let body = serde_json::to_vec(&json!({ "external_payment_ref": "pi_42", "status": "completed" })).unwrap();
        let verifier = WebhookVerifier::new(WEBHOOK_SECRET, Duration::from_secs(300));
        let now = chrono::Utc::now().timestamp();

        let forged = verifier.header_value(now, b"{}").unwrap();
        assert_eq!(signed_post(&router, &body, Some(forged)).await, StatusCode::UNAUTHORIZED);
        assert_eq!(signed_post(&router, &body, None).await, StatusCode::UNAUTHORIZED);

        let signature = verifier.header_value(now, &body).unwrap();
        assert_eq!(signed_post(&router, &body, Some(signature)).await, StatusCode::OK);

        let (_, mine) = json_request(&router, "GET", "/api/v1/transactions/mine", Some(&user), None).await;
        assert_eq!(mine[0]["status"], "completed");
    }
}

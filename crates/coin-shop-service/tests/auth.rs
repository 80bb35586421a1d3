//! Authentication integration tests.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderValue, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use coin_shop_core::DEFAULT_INITIAL_BALANCE;
use coin_shop_service::{ServiceConfig, TokenSigner};
use coin_shop_store::MemoryStore;
use common::{test_config, TestHarness, INITIAL_BALANCE, TEST_SECRET};

// ============================================================================
// POST /api/auth
// ============================================================================

#[tokio::test]
async fn first_login_registers_with_initial_balance() {
    let harness = TestHarness::new();

    let token = harness.login("alice", "password").await;
    assert!(!token.is_empty());

    let info = harness.info(&token).await;
    assert_eq!(info["coins"], INITIAL_BALANCE);
    assert_eq!(info["inventory"], json!([]));
    assert_eq!(info["coinHistory"]["received"], json!([]));
    assert_eq!(info["coinHistory"]["sent"], json!([]));
}

#[tokio::test]
async fn default_config_registers_with_zero_balance() {
    let harness = TestHarness::with_config(
        MemoryStore::with_default_catalog(),
        ServiceConfig {
            initial_balance: ServiceConfig::default().initial_balance,
            ..test_config()
        },
    );

    let token = harness.login("newcomer", "password").await;
    let info = harness.info(&token).await;
    assert_eq!(DEFAULT_INITIAL_BALANCE, 0);
    assert_eq!(info["coins"], 0);
    assert_eq!(info["inventory"], json!([]));

    let response = harness
        .server
        .get("/api/buy/pen")
        .add_header(AUTHORIZATION, TestHarness::bearer(&token))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(harness.info(&token).await["coins"], 0);
}

#[tokio::test]
async fn repeat_login_with_same_password_succeeds() {
    let harness = TestHarness::new();

    harness.login("alice", "password").await;
    let token = harness.login("alice", "password").await;

    let info = harness.info(&token).await;
    assert_eq!(info["coins"], INITIAL_BALANCE);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let harness = TestHarness::new();
    harness.login("alice", "password").await;

    let response = harness
        .server
        .post("/api/auth")
        .json(&json!({ "username": "alice", "password": "wrong" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert!(body["errors"].is_string());
}

#[tokio::test]
async fn missing_fields_are_bad_requests() {
    let harness = TestHarness::new();

    for body in [
        json!({ "password": "pw" }),
        json!({ "username": "alice" }),
        json!({ "username": "", "password": "pw" }),
        json!({ "username": "alice", "password": "" }),
    ] {
        let response = harness.server.post("/api/auth").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/auth")
        .bytes("{not json".into())
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["errors"], "invalid request body");
}

// ============================================================================
// Bearer token checks
// ============================================================================

#[tokio::test]
async fn protected_routes_require_token() {
    let harness = TestHarness::new();

    harness
        .server
        .get("/api/info")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    harness
        .server
        .get("/api/buy/cup")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    harness
        .server
        .post("/api/sendCoin")
        .json(&json!({ "toUser": "bob", "amount": 1 }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_authorization_header_is_unauthorized() {
    let harness = TestHarness::new();
    let token = harness.login("alice", "password").await;

    for value in [token.clone(), format!("Basic {token}"), "Bearer ".into()] {
        let response = harness
            .server
            .get("/api/info")
            .add_header(AUTHORIZATION, HeaderValue::from_str(&value).unwrap())
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn token_signed_with_other_key_is_unauthorized() {
    let harness = TestHarness::new();
    harness.login("alice", "password").await;

    let forged = TokenSigner::new(b"some-other-secret", 24)
        .issue(&"alice".parse().unwrap())
        .unwrap();

    let response = harness
        .server
        .get("/api/info")
        .add_header(AUTHORIZATION, TestHarness::bearer(&forged))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let harness = TestHarness::new();
    harness.login("alice", "password").await;

    let expired = TokenSigner::new(TEST_SECRET.as_bytes(), 24)
        .issue_at(&"alice".parse().unwrap(), Utc::now() - Duration::hours(48))
        .unwrap();

    let response = harness
        .server
        .get("/api/info")
        .add_header(AUTHORIZATION, TestHarness::bearer(&expired))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

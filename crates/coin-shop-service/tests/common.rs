//! Common test utilities for coin-shop integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;
use axum::Router;
use axum_test::TestServer;
use serde_json::json;

use coin_shop_service::{create_router, AppState, HashCost, ServiceConfig};
use coin_shop_store::{MemoryStore, Store};

/// Signing secret shared by the harness and tests that forge tokens.
pub const TEST_SECRET: &str = "test-secret";

/// Opening balance of every account the harness registers.
pub const INITIAL_BALANCE: i64 = 1000;

/// Configuration used by the harness: fixed secret, cheap argon2 cost and
/// [`INITIAL_BALANCE`] for new accounts.
pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        listen_addr: "127.0.0.1:0".into(),
        jwt_secret: TEST_SECRET.into(),
        initial_balance: INITIAL_BALANCE,
        hash_cost: HashCost {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        },
        ..ServiceConfig::default()
    }
}

/// Build a test server over any store.
pub fn test_server(store: Arc<dyn Store>, config: ServiceConfig) -> TestServer {
    let state = AppState::new(store, config);
    let router: Router = create_router(state);

    TestServer::new(router).expect("Failed to create test server")
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The backing store, for direct inspection.
    pub store: Arc<MemoryStore>,
}

impl TestHarness {
    /// Create a new test harness with a fresh store and the default catalogue.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::with_default_catalog())
    }

    /// Create a harness over `store`.
    pub fn with_store(store: MemoryStore) -> Self {
        Self::with_config(store, test_config())
    }

    /// Create a harness over `store` with a custom configuration.
    pub fn with_config(store: MemoryStore, config: ServiceConfig) -> Self {
        let store = Arc::new(store);
        let server = test_server(Arc::clone(&store) as _, config);

        Self { server, store }
    }

    /// Authenticate (registering on first use) and return the token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .server
            .post("/api/auth")
            .json(&json!({ "username": username, "password": password }))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        body["token"]
            .as_str()
            .expect("token in auth response")
            .to_string()
    }

    /// Authorization header value for `token`.
    pub fn bearer(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {token}")).expect("valid header value")
    }

    /// Fetch `/api/info` for `token`.
    pub async fn info(&self, token: &str) -> serde_json::Value {
        let response = self
            .server
            .get("/api/info")
            .add_header(AUTHORIZATION, Self::bearer(token))
            .await;
        response.assert_status_ok();
        response.json()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

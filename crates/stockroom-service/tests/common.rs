//! Common test utilities for stockroom integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::{TestRequest, TestServer};
use serde_json::json;

use stockroom_core::StaffId;
use stockroom_service::scheduler::{RecordingScheduler, ReminderScheduler};
use stockroom_service::{create_router, AppState, ServiceConfig};
use stockroom_store::{MemoryStore, Store};

/// Gateway key wired into the test configuration.
pub const TEST_GATEWAY_KEY: &str = "test-gateway-key";

/// Display name sent in the identity headers.
pub const TEST_STAFF_NAME: &str = "Alex Recorder";

/// Email sent in the identity headers.
pub const TEST_STAFF_EMAIL: &str = "alex@example.test";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct handle on the in-memory store for seeding/inspection.
    pub store: Arc<MemoryStore>,
    /// Recording scheduler for asserting on scheduled reminders.
    pub scheduler: Arc<RecordingScheduler>,
    /// The staff member behind the identity headers.
    pub staff_id: StaffId,
}

impl TestHarness {
    /// Create a new test harness with fresh in-memory state.
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let scheduler = Arc::new(RecordingScheduler::new());

        let config = ServiceConfig {
            gateway_api_key: Some(TEST_GATEWAY_KEY.to_string()),
            ..ServiceConfig::default()
        };

        let state = AppState::new(
            Arc::clone(&store) as Arc<dyn Store>,
            Arc::clone(&scheduler) as Arc<dyn ReminderScheduler>,
            config,
        )
        .expect("valid test configuration");
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            scheduler,
            staff_id: StaffId::generate(),
        }
    }

    /// POST with the full identity header set.
    pub fn post(&self, path: &str) -> TestRequest {
        self.with_identity(self.server.post(path))
    }

    /// GET with the full identity header set.
    pub fn get(&self, path: &str) -> TestRequest {
        self.with_identity(self.server.get(path))
    }

    /// DELETE with the full identity header set.
    pub fn delete(&self, path: &str) -> TestRequest {
        self.with_identity(self.server.delete(path))
    }

    fn with_identity(&self, request: TestRequest) -> TestRequest {
        request
            .add_header("x-api-key", TEST_GATEWAY_KEY)
            .add_header("x-staff-id", self.staff_id.to_string())
            .add_header("x-staff-name", TEST_STAFF_NAME)
            .add_header("x-staff-email", TEST_STAFF_EMAIL)
    }

    /// Register an item and receive `quantity` units into it.
    pub async fn seed_item(&self, code: &str, quantity: i64) {
        self.post("/v1/items")
            .json(&json!({
                "code": code,
                "name": format!("Item {code}"),
                "category": "tools",
                "unit": "pcs"
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        if quantity > 0 {
            let response = self
                .post("/v1/stock/receive")
                .json(&json!({
                    "entries": [{ "item_code": code, "quantity": quantity }]
                }))
                .await;
            response.assert_status_ok();
            let body: serde_json::Value = response.json();
            assert_eq!(body["failed"], 0, "seeding must not fail");
        }
    }

    /// Current balance of an item, via the API.
    pub async fn balance_of(&self, code: &str) -> i64 {
        let response = self.get(&format!("/v1/items/{code}")).await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["balance"]["balance"].as_i64().expect("balance field")
    }
}

//! Borrow lifecycle integration tests.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, NaiveDate};
use common::TestHarness;
use serde_json::json;

use stockroom_core::CivilClock;

/// Today's civil date under the default UTC+7 clock.
fn civil_today() -> NaiveDate {
    CivilClock::default().now().date_naive()
}

fn as_due_string(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

async fn borrow(
    harness: &TestHarness,
    code: &str,
    quantity: i64,
    due_date: Option<String>,
) -> axum_test::TestResponse {
    let mut body = json!({ "item_code": code, "quantity": quantity });
    if let Some(due) = due_date {
        body["due_date"] = json!(due);
    }
    harness.post("/v1/borrows").json(&body).await
}

// ============================================================================
// Borrow
// ============================================================================

#[tokio::test]
async fn borrow_debits_balance_and_schedules_reminder() {
    let harness = TestHarness::new();
    harness.seed_item("IT-001", 10).await;

    let due = civil_today() + Duration::days(2);
    let response = borrow(&harness, "IT-001", 3, Some(as_due_string(due))).await;
    response.assert_status(StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "borrowed");
    assert_eq!(body["quantity"], 3);
    assert_eq!(body["item_code"], "IT-001");
    let token = body["id"].as_str().unwrap();
    assert_eq!(token.len(), 10);
    assert!(token
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

    assert_eq!(harness.balance_of("IT-001").await, 7);

    // One BORROW audit row, old 10 -> packed new 7|+0|-3.
    let logs = harness.get("/v1/audit-logs?item_code=IT-001").await;
    let logs: serde_json::Value = logs.json();
    let latest = &logs["entries"][0];
    assert_eq!(latest["action"], "borrow");
    assert_eq!(latest["old_value"], "10");
    assert_eq!(latest["new_value"], "7|+0|-3");

    // Three-day window: reminder lands on the due date at 08:30 civil.
    let scheduled = harness.scheduler.scheduled();
    assert_eq!(scheduled.len(), 1);
    let (fire_at, payload) = &scheduled[0];
    let expected = CivilClock::default().to_instant(
        due.and_hms_opt(8, 30, 0).unwrap(),
    );
    assert_eq!(*fire_at, expected);
    assert_eq!(payload.to, common::TEST_STAFF_EMAIL);
    assert_eq!(payload.borrow_id.as_str(), token);

    // The job handle is attached to the stored record and echoed back.
    assert_eq!(body["scheduled_job"], "recorded-1");
}

#[tokio::test]
async fn borrow_without_due_date_schedules_nothing() {
    let harness = TestHarness::new();
    harness.seed_item("IT-001", 10).await;

    let response = borrow(&harness, "IT-001", 2, None).await;
    response.assert_status(StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert!(body["scheduled_job"].is_null());
    assert!(harness.scheduler.scheduled().is_empty());
}

#[tokio::test]
async fn borrow_with_past_due_date_skips_reminder_silently() {
    let harness = TestHarness::new();
    harness.seed_item("IT-001", 10).await;

    let response = borrow(&harness, "IT-001", 2, Some("01/01/2020".into())).await;
    response.assert_status(StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert!(body["scheduled_job"].is_null());
    assert!(harness.scheduler.scheduled().is_empty());
    assert_eq!(harness.balance_of("IT-001").await, 8);
}

#[tokio::test]
async fn borrow_rejects_malformed_due_dates() {
    let harness = TestHarness::new();
    harness.seed_item("IT-001", 10).await;

    for bad in ["2026-12-31", "13/13/2026"] {
        let response = borrow(&harness, "IT-001", 2, Some(bad.into())).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    // Rejected before any mutation.
    assert_eq!(harness.balance_of("IT-001").await, 10);
    assert!(harness.scheduler.scheduled().is_empty());
}

#[tokio::test]
async fn borrow_unknown_item_is_not_found() {
    let harness = TestHarness::new();
    let response = borrow(&harness, "GHOST", 1, None).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn borrow_beyond_balance_reports_current_balance() {
    let harness = TestHarness::new();
    harness.seed_item("IT-001", 10).await;

    let response = borrow(&harness, "IT-001", 15, None).await;
    response.assert_status(StatusCode::CONFLICT);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_stock");
    assert_eq!(body["error"]["details"]["balance"], 10);
    assert_eq!(body["error"]["details"]["requested"], 15);

    assert_eq!(harness.balance_of("IT-001").await, 10);
}

// ============================================================================
// Return
// ============================================================================

#[tokio::test]
async fn return_restores_balance_and_second_return_conflicts() {
    let harness = TestHarness::new();
    harness.seed_item("IT-001", 10).await;

    let due = civil_today() + Duration::days(2);
    let response = borrow(&harness, "IT-001", 3, Some(as_due_string(due))).await;
    let body: serde_json::Value = response.json();
    let token = body["id"].as_str().unwrap();

    let returned = harness
        .post(&format!("/v1/borrows/{token}/return"))
        .await;
    returned.assert_status_ok();
    let returned: serde_json::Value = returned.json();
    assert_eq!(returned["status"], "returned");
    assert!(!returned["returned_at"].is_null());

    assert_eq!(harness.balance_of("IT-001").await, 10);

    // RETURN audit row appended on top of the BORROW one.
    let logs = harness.get("/v1/audit-logs?item_code=IT-001").await;
    let logs: serde_json::Value = logs.json();
    assert_eq!(logs["entries"][0]["action"], "return");
    assert_eq!(logs["entries"][0]["old_value"], "7");
    assert_eq!(logs["entries"][0]["new_value"], "10|+0|+3");

    // Second return: conflict, state unchanged.
    let again = harness
        .post(&format!("/v1/borrows/{token}/return"))
        .await;
    again.assert_status(StatusCode::CONFLICT);
    assert_eq!(harness.balance_of("IT-001").await, 10);
}

#[tokio::test]
async fn return_unknown_token_is_not_found() {
    let harness = TestHarness::new();
    let response = harness.post("/v1/borrows/ABCDEF1234/return").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn return_after_item_deleted_still_succeeds() {
    let harness = TestHarness::new();
    harness.seed_item("IT-001", 10).await;

    let response = borrow(&harness, "IT-001", 3, None).await;
    let body: serde_json::Value = response.json();
    let token = body["id"].as_str().unwrap();

    harness
        .delete("/v1/items/IT-001")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let returned = harness
        .post(&format!("/v1/borrows/{token}/return"))
        .await;
    returned.assert_status_ok();
    let returned: serde_json::Value = returned.json();
    assert_eq!(returned["status"], "returned");
}

// ============================================================================
// History
// ============================================================================

#[tokio::test]
async fn history_lists_own_loans_newest_first() {
    let harness = TestHarness::new();
    harness.seed_item("IT-001", 10).await;

    let first: serde_json::Value = borrow(&harness, "IT-001", 1, None).await.json();
    let second: serde_json::Value = borrow(&harness, "IT-001", 2, None).await.json();

    let history = harness.get("/v1/borrows/history").await;
    history.assert_status_ok();
    let history: serde_json::Value = history.json();
    let transactions = history["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 2);
    // Same-instant checkouts can tie on the timestamp, so just require both
    // tokens to be present and no one else's.
    let ids: Vec<_> = transactions
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&first["id"].as_str().unwrap()));
    assert!(ids.contains(&second["id"].as_str().unwrap()));
}

#[tokio::test]
async fn borrow_eventually_lands_an_inbox_notification() {
    let harness = TestHarness::new();
    harness.seed_item("IT-001", 10).await;
    borrow(&harness, "IT-001", 1, None)
        .await
        .assert_status(StatusCode::CREATED);

    // The dispatch is spawned after the commit; poll briefly.
    for _ in 0..50 {
        let inbox = harness.get("/v1/notifications").await;
        let inbox: serde_json::Value = inbox.json();
        let notifications = inbox["notifications"].as_array().unwrap();
        if !notifications.is_empty() {
            assert_eq!(notifications[0]["notification"]["title"], "Checkout recorded");
            assert_eq!(notifications[0]["read"], false);
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("checkout notification never arrived");
}

// ============================================================================
// Identity gate
// ============================================================================

#[tokio::test]
async fn requests_without_identity_headers_are_unauthorized() {
    let harness = TestHarness::new();
    let response = harness
        .server
        .post("/v1/borrows")
        .json(&json!({ "item_code": "IT-001", "quantity": 1 }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_gateway_key_is_unauthorized() {
    let harness = TestHarness::new();
    let response = harness
        .server
        .get("/v1/borrows/history")
        .add_header("x-api-key", "wrong-key")
        .add_header("x-staff-id", harness.staff_id.to_string())
        .add_header("x-staff-name", "Alex")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

//! Notification retrieval integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;

use stockroom_core::{Notification, NotificationKind, StaffId};
use stockroom_store::Store;

#[tokio::test]
async fn inbox_mixes_direct_and_broadcast_with_read_state() {
    let harness = TestHarness::new();

    let broadcast = Notification::broadcast(
        "Stocktake".into(),
        "Stockroom closed Friday".into(),
        NotificationKind::Info,
    );
    harness.store.put_notification(&broadcast).await.unwrap();

    let direct = Notification::direct(
        harness.staff_id,
        "Return due".into(),
        "Your loan is due tomorrow".into(),
        NotificationKind::Reminder,
    );
    harness.store.put_notification(&direct).await.unwrap();

    let someone_elses = Notification::direct(
        StaffId::generate(),
        "Return due".into(),
        "Not yours".into(),
        NotificationKind::Reminder,
    );
    harness
        .store
        .put_notification(&someone_elses)
        .await
        .unwrap();

    let inbox = harness.get("/v1/notifications").await;
    inbox.assert_status_ok();
    let inbox: serde_json::Value = inbox.json();
    let notifications = inbox["notifications"].as_array().unwrap();
    assert_eq!(notifications.len(), 2);
    assert!(notifications.iter().all(|n| n["read"] == false));

    // Mark the broadcast read; only the caller's flag flips.
    harness
        .post(&format!("/v1/notifications/{}/read", broadcast.id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let inbox = harness.get("/v1/notifications").await;
    let inbox: serde_json::Value = inbox.json();
    for entry in inbox["notifications"].as_array().unwrap() {
        let expected = entry["notification"]["id"] == broadcast.id.to_string();
        assert_eq!(entry["read"], expected);
    }
}

#[tokio::test]
async fn marking_read_twice_is_idempotent() {
    let harness = TestHarness::new();
    let note = Notification::direct(
        harness.staff_id,
        "Return due".into(),
        "Your loan is due tomorrow".into(),
        NotificationKind::Reminder,
    );
    harness.store.put_notification(&note).await.unwrap();

    for _ in 0..2 {
        harness
            .post(&format!("/v1/notifications/{}/read", note.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }
}

#[tokio::test]
async fn marking_unknown_notification_is_not_found() {
    let harness = TestHarness::new();
    let response = harness
        .post(&format!(
            "/v1/notifications/{}/read",
            stockroom_core::NotificationId::generate()
        ))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

//! Client SDK tests against a mocked stockroom API.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stockroom_client::{
    BorrowItemRequest, ClientError, StaffContext, StockMovementEntry, StockroomClient,
};

fn staff() -> StaffContext {
    StaffContext {
        staff_id: "7b0e9f6a-54b3-4b6e-a1e0-2f4dd7cf60a5".into(),
        name: "Alex Recorder".into(),
        email: Some("alex@example.test".into()),
    }
}

fn client_for(server: &MockServer) -> StockroomClient {
    StockroomClient::new(server.uri(), "gateway-key", staff())
}

fn transaction_body(token: &str) -> serde_json::Value {
    json!({
        "id": token,
        "staff_id": "7b0e9f6a-54b3-4b6e-a1e0-2f4dd7cf60a5",
        "recorder": "Alex Recorder",
        "item_code": "IT-001",
        "item_name": "Cordless drill",
        "quantity": 2,
        "job_ref": null,
        "borrowed_at": "2026-03-10T03:00:00Z",
        "due_date": "2026-03-12",
        "returned_at": null,
        "status": "borrowed",
        "note": null,
        "scheduled_job": "7d0a2f1c-1111-2222-3333-444455556666"
    })
}

#[tokio::test]
async fn borrow_item_parses_transaction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/borrows"))
        .and(header("x-api-key", "gateway-key"))
        .and(header("x-staff-name", "Alex Recorder"))
        .respond_with(ResponseTemplate::new(201).set_body_json(transaction_body("AB12CD34EF")))
        .mount(&server)
        .await;

    let loan = client_for(&server)
        .borrow_item(BorrowItemRequest {
            item_code: "IT-001".into(),
            quantity: 2,
            due_date: Some("12/03/2026".into()),
            job_ref: None,
            note: None,
        })
        .await
        .unwrap();

    assert_eq!(loan.id, "AB12CD34EF");
    assert_eq!(loan.status, "borrowed");
    assert_eq!(loan.quantity, 2);
    assert!(loan.scheduled_job.is_some());
}

#[tokio::test]
async fn insufficient_stock_maps_to_typed_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/borrows"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {
                "code": "insufficient_stock",
                "message": "insufficient stock for IT-001: balance=1, requested=5",
                "details": { "item_code": "IT-001", "balance": 1, "requested": 5 }
            }
        })))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .borrow_item(BorrowItemRequest {
            item_code: "IT-001".into(),
            quantity: 5,
            due_date: None,
            job_ref: None,
            note: None,
        })
        .await;

    assert!(matches!(
        result,
        Err(ClientError::InsufficientStock {
            balance: 1,
            requested: 5
        })
    ));
}

#[tokio::test]
async fn return_of_returned_loan_maps_to_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/borrows/AB12CD34EF/return"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {
                "code": "conflict",
                "message": "borrow transaction already returned: AB12CD34EF"
            }
        })))
        .mount(&server)
        .await;

    let result = client_for(&server).return_item("AB12CD34EF").await;
    assert!(matches!(result, Err(ClientError::Conflict { .. })));
}

#[tokio::test]
async fn unknown_item_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/items/GHOST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": "not_found", "message": "item not found: GHOST" }
        })))
        .mount(&server)
        .await;

    let result = client_for(&server).get_item("GHOST").await;
    assert!(matches!(result, Err(ClientError::NotFound { .. })));
}

#[tokio::test]
async fn receive_stock_parses_batch_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/stock/receive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "item_code": "IT-001", "success": true, "old_balance": 0, "new_balance": 10 },
                { "item_code": "GHOST", "success": false, "error": "item not found: GHOST" }
            ],
            "processed": 1,
            "failed": 1
        })))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .receive_stock(vec![
            StockMovementEntry {
                item_code: "IT-001".into(),
                quantity: 10,
                note: None,
            },
            StockMovementEntry {
                item_code: "GHOST".into(),
                quantity: 1,
                note: None,
            },
        ])
        .await
        .unwrap();

    assert_eq!(response.processed, 1);
    assert_eq!(response.failed, 1);
    assert_eq!(response.results[0].new_balance, Some(10));
    assert!(!response.results[1].success);
}

#[tokio::test]
async fn audit_logs_pass_item_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/audit-logs"))
        .and(query_param("item_code", "IT-001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": [{
                "id": "01J9ZX2Q5W8N3VY4K6T7R8S9A0",
                "action": "borrow",
                "table_name": "stock_balances",
                "record_id": "IT-001",
                "old_value": "10",
                "new_value": "8|+0|-2",
                "actor": "Alex Recorder",
                "created_at": "2026-03-10T03:00:00Z"
            }]
        })))
        .mount(&server)
        .await;

    let logs = client_for(&server).audit_logs(Some("IT-001")).await.unwrap();
    assert_eq!(logs.entries.len(), 1);
    assert_eq!(logs.entries[0].new_value, "8|+0|-2");
}

//! Borrow lifecycle handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use stockroom_core::{
    BorrowId, BorrowTransaction, ItemCode, Notification, NotificationKind,
};

use crate::auth::StaffIdentity;
use crate::engine::BorrowRequest;
use crate::error::ApiError;
use crate::state::AppState;

/// Checkout request body.
#[derive(Debug, Deserialize)]
pub struct BorrowRequestBody {
    /// The item to borrow.
    pub item_code: String,
    /// Quantity to borrow.
    pub quantity: i64,
    /// Optional due date, strict `dd/MM/yyyy`.
    pub due_date: Option<String>,
    /// Optional caller-supplied job reference.
    pub job_ref: Option<String>,
    /// Optional free-form note.
    pub note: Option<String>,
}

/// Borrow history response.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// The caller's transactions, newest first.
    pub transactions: Vec<BorrowTransaction>,
}

/// Check out stock to the calling staff member.
pub async fn borrow_item(
    State(state): State<Arc<AppState>>,
    identity: StaffIdentity,
    Json(body): Json<BorrowRequestBody>,
) -> Result<(StatusCode, Json<BorrowTransaction>), ApiError> {
    let item_code: ItemCode = body
        .item_code
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid item code".into()))?;

    let transaction = state
        .engine
        .borrow(BorrowRequest {
            staff_id: identity.staff_id,
            recorder_name: identity.name.clone(),
            recorder_email: identity.email.clone(),
            item_code,
            quantity: body.quantity,
            job_ref: body.job_ref,
            due_date: body.due_date,
            note: body.note,
        })
        .await?;

    notify_best_effort(
        &state,
        Notification::direct(
            transaction.staff_id,
            "Checkout recorded".into(),
            checkout_message(&transaction),
            NotificationKind::Info,
        ),
    );

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Check a loan back in by its public token.
pub async fn return_item(
    State(state): State<Arc<AppState>>,
    identity: StaffIdentity,
    Path(id): Path<String>,
) -> Result<Json<BorrowTransaction>, ApiError> {
    let borrow_id: BorrowId = id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid borrow token".into()))?;

    let transaction = state.engine.return_loan(&borrow_id, &identity.name).await?;

    notify_best_effort(
        &state,
        Notification::direct(
            transaction.staff_id,
            "Return recorded".into(),
            format!(
                "{} × {} checked back in",
                transaction.quantity, transaction.item_name
            ),
            NotificationKind::Info,
        ),
    );

    Ok(Json(transaction))
}

/// The calling staff member's borrow history, newest first.
pub async fn history(
    State(state): State<Arc<AppState>>,
    identity: StaffIdentity,
) -> Result<Json<HistoryResponse>, ApiError> {
    let transactions = state.engine.history(&identity.staff_id).await?;
    Ok(Json(HistoryResponse { transactions }))
}

/// Dispatch a notification without blocking or failing the request; the
/// ledger mutation already committed.
fn notify_best_effort(state: &AppState, notification: Notification) {
    let notifier = Arc::clone(&state.notifier);
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(notification).await {
            tracing::warn!(error = %e, "Failed to dispatch notification");
        }
    });
}

fn checkout_message(transaction: &BorrowTransaction) -> String {
    match transaction.due_date {
        Some(due) => format!(
            "{} × {} checked out, due back {}",
            transaction.quantity,
            transaction.item_name,
            due.format("%d/%m/%Y")
        ),
        None => format!(
            "{} × {} checked out",
            transaction.quantity, transaction.item_name
        ),
    }
}

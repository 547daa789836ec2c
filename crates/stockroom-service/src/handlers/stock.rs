//! Stock movement handlers.
//!
//! Receive and withdraw are thin wrappers over the balance mutator. Both
//! accept a batch; entries are processed independently with partial success
//! reported per entry, so one bad item code doesn't sink the rest.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use stockroom_core::{ItemCode, StockAction};

use crate::auth::StaffIdentity;
use crate::error::ApiError;
use crate::state::AppState;

/// One stock movement in a batch.
#[derive(Debug, Deserialize)]
pub struct StockMovementEntry {
    /// The item to adjust.
    pub item_code: String,
    /// Quantity to move (strictly positive).
    pub quantity: i64,
    /// Optional free-form note, logged but not persisted by the ledger.
    pub note: Option<String>,
}

/// Batch stock movement request.
#[derive(Debug, Deserialize)]
pub struct StockMovementRequest {
    /// The movements to apply, each processed independently.
    pub entries: Vec<StockMovementEntry>,
}

/// Result for a single entry in a batch.
#[derive(Debug, Serialize)]
pub struct StockMovementResult {
    /// The item code as submitted.
    pub item_code: String,
    /// Whether this entry was applied.
    pub success: bool,
    /// Error message if the entry failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Balance before the movement (if applied).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_balance: Option<i64>,
    /// Balance after the movement (if applied).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_balance: Option<i64>,
}

/// Batch stock movement response.
#[derive(Debug, Serialize)]
pub struct StockMovementResponse {
    /// Per-entry results, in submission order.
    pub results: Vec<StockMovementResult>,
    /// Entries applied.
    pub processed: usize,
    /// Entries rejected.
    pub failed: usize,
}

/// Receive stock into the ledger.
pub async fn receive_stock(
    State(state): State<Arc<AppState>>,
    identity: StaffIdentity,
    Json(body): Json<StockMovementRequest>,
) -> Result<Json<StockMovementResponse>, ApiError> {
    Ok(Json(
        apply_batch(&state, &identity, StockAction::Receive, body.entries).await,
    ))
}

/// Withdraw stock from the ledger.
pub async fn withdraw_stock(
    State(state): State<Arc<AppState>>,
    identity: StaffIdentity,
    Json(body): Json<StockMovementRequest>,
) -> Result<Json<StockMovementResponse>, ApiError> {
    Ok(Json(
        apply_batch(&state, &identity, StockAction::Withdraw, body.entries).await,
    ))
}

async fn apply_batch(
    state: &AppState,
    identity: &StaffIdentity,
    action: StockAction,
    entries: Vec<StockMovementEntry>,
) -> StockMovementResponse {
    let mut results = Vec::with_capacity(entries.len());
    let mut processed = 0;
    let mut failed = 0;

    for entry in entries {
        let item_code = entry.item_code.clone();
        match apply_one(state, identity, action, entry).await {
            Ok((old_balance, new_balance)) => {
                results.push(StockMovementResult {
                    item_code,
                    success: true,
                    error: None,
                    old_balance: Some(old_balance),
                    new_balance: Some(new_balance),
                });
                processed += 1;
            }
            Err(e) => {
                results.push(StockMovementResult {
                    item_code,
                    success: false,
                    error: Some(e.to_string()),
                    old_balance: None,
                    new_balance: None,
                });
                failed += 1;
            }
        }
    }

    StockMovementResponse {
        results,
        processed,
        failed,
    }
}

async fn apply_one(
    state: &AppState,
    identity: &StaffIdentity,
    action: StockAction,
    entry: StockMovementEntry,
) -> Result<(i64, i64), ApiError> {
    let code: ItemCode = entry
        .item_code
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid item code".into()))?;

    let (old_balance, new_balance) = state
        .store
        .apply_stock_movement(&code, action, entry.quantity, &identity.name)
        .await?;

    tracing::info!(
        item_code = %code,
        action = %action.as_str(),
        quantity = %entry.quantity,
        old_balance = %old_balance,
        new_balance = %new_balance,
        actor = %identity.name,
        note = ?entry.note,
        "Stock movement applied"
    );

    Ok((old_balance, new_balance))
}

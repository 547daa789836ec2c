//! Request and response types for the stockroom API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One stock movement in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct StockMovementEntry {
    /// The item to adjust.
    pub item_code: String,
    /// Quantity to move (strictly positive).
    pub quantity: i64,
    /// Optional free-form note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Batch stock movement request body.
#[derive(Debug, Clone, Serialize)]
pub struct StockMovementRequest {
    /// The movements to apply, each processed independently.
    pub entries: Vec<StockMovementEntry>,
}

/// Result for a single entry in a batch.
#[derive(Debug, Clone, Deserialize)]
pub struct StockMovementResult {
    /// The item code as submitted.
    pub item_code: String,
    /// Whether this entry was applied.
    pub success: bool,
    /// Error message if the entry failed.
    pub error: Option<String>,
    /// Balance before the movement (if applied).
    pub old_balance: Option<i64>,
    /// Balance after the movement (if applied).
    pub new_balance: Option<i64>,
}

/// Batch stock movement response.
#[derive(Debug, Clone, Deserialize)]
pub struct StockMovementResponse {
    /// Per-entry results, in submission order.
    pub results: Vec<StockMovementResult>,
    /// Entries applied.
    pub processed: usize,
    /// Entries rejected.
    pub failed: usize,
}

/// Checkout request.
#[derive(Debug, Clone, Serialize)]
pub struct BorrowItemRequest {
    /// The item to borrow.
    pub item_code: String,
    /// Quantity to borrow.
    pub quantity: i64,
    /// Optional due date, strict `dd/MM/yyyy`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Optional caller-supplied job reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_ref: Option<String>,
    /// Optional free-form note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A borrow transaction as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct BorrowTransaction {
    /// Public token used for the return.
    pub id: String,
    /// The borrowing staff member.
    pub staff_id: String,
    /// Who recorded the checkout.
    pub recorder: String,
    /// The borrowed item's code.
    pub item_code: String,
    /// Item name snapshotted at borrow time.
    pub item_name: String,
    /// Quantity out on loan.
    pub quantity: i64,
    /// Caller-supplied job reference.
    pub job_ref: Option<String>,
    /// When the checkout happened.
    pub borrowed_at: DateTime<Utc>,
    /// Agreed due date.
    pub due_date: Option<NaiveDate>,
    /// When the loan was checked back in.
    pub returned_at: Option<DateTime<Utc>>,
    /// Lifecycle state: "borrowed" or "returned".
    pub status: String,
    /// Free-form note.
    pub note: Option<String>,
    /// Handle of the scheduled reminder job, if any.
    pub scheduled_job: Option<String>,
}

/// Borrow history response.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    /// The caller's transactions, newest first.
    pub transactions: Vec<BorrowTransaction>,
}

/// A catalog item.
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    /// Unique business key.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Category label.
    pub category: String,
    /// Unit of measure.
    pub unit: String,
}

/// An item's balance row.
#[derive(Debug, Clone, Deserialize)]
pub struct StockBalance {
    /// The item this row belongs to.
    pub item_code: String,
    /// Cumulative quantity ever received.
    pub total_quantity: i64,
    /// Running receive counter.
    pub received_qty: i64,
    /// Cumulative quantity withdrawn or out on loan.
    pub withdrawn_qty: i64,
    /// Current available quantity.
    pub balance: i64,
}

/// Item plus its current balance.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemWithBalance {
    /// The catalog item.
    pub item: Item,
    /// Its balance row.
    pub balance: StockBalance,
}

/// One audit entry.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditEntry {
    /// Time-ordered entry ID.
    pub id: String,
    /// The recorded action.
    pub action: String,
    /// The mutated table.
    pub table_name: String,
    /// The mutated record's key (item code).
    pub record_id: String,
    /// Balance before the mutation.
    pub old_value: String,
    /// Packed balance + per-leg deltas after the mutation.
    pub new_value: String,
    /// Who recorded the mutation.
    pub actor: String,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

/// Audit listing response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditLogsResponse {
    /// Matching entries, newest first.
    pub entries: Vec<AuditEntry>,
}

/// Error response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// The error body.
    pub error: ApiErrorBody,
}

/// Error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Structured details (e.g. current balance on insufficient stock).
    pub details: Option<serde_json::Value>,
}

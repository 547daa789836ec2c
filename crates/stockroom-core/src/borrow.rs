//! Borrow transaction types.
//!
//! A borrow transaction is the checkout record for an outstanding loan. Its
//! lifecycle is `Borrowed -> Returned` and nothing else; records are created
//! on borrow, mutated exactly once on return, and never deleted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{BorrowId, ItemCode, StaffId};

/// Lifecycle state of a borrow transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorrowStatus {
    /// Stock is out on loan.
    Borrowed,

    /// Stock has been checked back in (terminal).
    Returned,
}

impl BorrowStatus {
    /// Status name as persisted.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Borrowed => "borrowed",
            Self::Returned => "returned",
        }
    }

    /// Parse a persisted status name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "borrowed" => Some(Self::Borrowed),
            "returned" => Some(Self::Returned),
            _ => None,
        }
    }
}

/// A checkout record for a loan of stock to a staff member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowTransaction {
    /// Public handle used for returns (short random token).
    pub id: BorrowId,

    /// The borrowing staff member.
    pub staff_id: StaffId,

    /// Name of the staff member who recorded the checkout.
    pub recorder: String,

    /// The borrowed item's code.
    pub item_code: ItemCode,

    /// The item name, snapshotted at borrow time so later catalog renames
    /// don't rewrite history.
    pub item_name: String,

    /// Quantity out on loan.
    pub quantity: i64,

    /// Optional caller-supplied job reference.
    pub job_ref: Option<String>,

    /// When the checkout happened.
    pub borrowed_at: DateTime<Utc>,

    /// Expected return date, if one was agreed.
    pub due_date: Option<NaiveDate>,

    /// When the loan was checked back in.
    pub returned_at: Option<DateTime<Utc>>,

    /// Lifecycle state.
    pub status: BorrowStatus,

    /// Free-form note.
    pub note: Option<String>,

    /// Handle of the scheduled reminder job, if one was created.
    pub scheduled_job: Option<String>,
}

impl BorrowTransaction {
    /// Create a new checkout record with a freshly generated token.
    #[must_use]
    pub fn checkout(
        staff_id: StaffId,
        recorder: String,
        item_code: ItemCode,
        item_name: String,
        quantity: i64,
        borrowed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BorrowId::generate(),
            staff_id,
            recorder,
            item_code,
            item_name,
            quantity,
            job_ref: None,
            borrowed_at,
            due_date: None,
            returned_at: None,
            status: BorrowStatus::Borrowed,
            note: None,
            scheduled_job: None,
        }
    }

    /// Set the agreed due date.
    #[must_use]
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Set the caller-supplied job reference.
    #[must_use]
    pub fn with_job_ref(mut self, job_ref: String) -> Self {
        self.job_ref = Some(job_ref);
        self
    }

    /// Set a free-form note.
    #[must_use]
    pub fn with_note(mut self, note: String) -> Self {
        self.note = Some(note);
        self
    }

    /// Whether the loan has been checked back in.
    #[must_use]
    pub const fn is_returned(&self) -> bool {
        matches!(self.status, BorrowStatus::Returned)
    }
}

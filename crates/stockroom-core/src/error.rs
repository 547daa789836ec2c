//! Error types for the stockroom ledger.

use crate::ids::IdError;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Item or its balance row not found.
    #[error("item not found: {item_code}")]
    ItemNotFound {
        /// The item code that was not found.
        item_code: String,
    },

    /// Borrow transaction not found.
    #[error("borrow transaction not found: {borrow_id}")]
    BorrowNotFound {
        /// The borrow token that was not found.
        borrow_id: String,
    },

    /// Item already registered.
    #[error("item already exists: {item_code}")]
    ItemAlreadyExists {
        /// The item code that already exists.
        item_code: String,
    },

    /// Withdrawal or borrow would drive the balance negative.
    #[error("insufficient stock for {item_code}: balance={balance}, requested={requested}")]
    InsufficientStock {
        /// The affected item code.
        item_code: String,
        /// Current available balance.
        balance: i64,
        /// Quantity the caller asked for.
        requested: i64,
    },

    /// The borrow transaction was already returned.
    #[error("borrow transaction already returned: {borrow_id}")]
    AlreadyReturned {
        /// The borrow token in question.
        borrow_id: String,
    },

    /// Due date string did not parse as strict day/month/year.
    #[error("invalid due date (expected dd/MM/yyyy): {input}")]
    InvalidDueDate {
        /// The rejected input.
        input: String,
    },

    /// Quantity must be strictly positive.
    #[error("invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity.
        quantity: i64,
    },

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// Reminder scheduling failed.
    #[error("scheduling error: {0}")]
    Scheduling(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

//! Error types for stockroom storage.

use stockroom_core::LedgerError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The missing entity kind ("item", "borrow transaction", ...).
        entity: &'static str,
        /// The key that was looked up.
        id: String,
    },

    /// Record already exists.
    #[error("{entity} already exists: {id}")]
    AlreadyExists {
        /// The duplicated entity kind.
        entity: &'static str,
        /// The clashing key.
        id: String,
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

    /// Quantity must be strictly positive.
    #[error("invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity.
        quantity: i64,
    },
}

impl StoreError {
    /// Convert a balance-mutator rejection into the storage taxonomy.
    ///
    /// [`stockroom_core::StockBalance::apply`] only ever reports
    /// insufficient stock or an invalid quantity; anything else would be a
    /// bug and is surfaced as a database error rather than swallowed.
    #[must_use]
    pub fn from_mutator(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientStock {
                item_code,
                balance,
                requested,
            } => Self::InsufficientStock {
                item_code,
                balance,
                requested,
            },
            LedgerError::InvalidQuantity { quantity } => Self::InvalidQuantity { quantity },
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity: "borrow transaction", id } => {
                Self::BorrowNotFound { borrow_id: id }
            }
            StoreError::NotFound { id, .. } => Self::ItemNotFound { item_code: id },
            StoreError::AlreadyExists { entity: "item", id } => {
                Self::ItemAlreadyExists { item_code: id }
            }
            StoreError::InsufficientStock {
                item_code,
                balance,
                requested,
            } => Self::InsufficientStock {
                item_code,
                balance,
                requested,
            },
            StoreError::AlreadyReturned { borrow_id } => Self::AlreadyReturned { borrow_id },
            StoreError::InvalidQuantity { quantity } => Self::InvalidQuantity { quantity },
            other => Self::Storage(other.to_string()),
        }
    }
}

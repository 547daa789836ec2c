//! Client error types.

/// Errors that can occur when using the stockroom client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Insufficient stock for a withdrawal or borrow.
    #[error("insufficient stock: balance={balance}, requested={requested}")]
    InsufficientStock {
        /// Current available balance.
        balance: i64,
        /// Quantity that was asked for.
        requested: i64,
    },

    /// Referenced item or borrow transaction does not exist.
    #[error("not found: {message}")]
    NotFound {
        /// Server-supplied description.
        message: String,
    },

    /// Duplicate resource or invalid state transition (e.g. returning an
    /// already-returned loan).
    #[error("conflict: {message}")]
    Conflict {
        /// Server-supplied description.
        message: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

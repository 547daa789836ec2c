//! Stockroom HTTP client implementation.

use reqwest::Client;
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{
    ApiErrorResponse, AuditLogsResponse, BorrowItemRequest, BorrowTransaction, HistoryResponse,
    ItemWithBalance, StockMovementEntry, StockMovementRequest, StockMovementResponse,
};

/// Options for building a [`StockroomClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

/// The staff member on whose behalf requests are made.
#[derive(Debug, Clone)]
pub struct StaffContext {
    /// Staff ID (UUID string).
    pub staff_id: String,
    /// Display name.
    pub name: String,
    /// Email, used as the reminder recipient.
    pub email: Option<String>,
}

/// Stockroom API client.
///
/// Provides methods for stock movements, the borrow/return lifecycle, and
/// audit retrieval, acting on behalf of one staff member.
#[derive(Debug, Clone)]
pub struct StockroomClient {
    client: Client,
    base_url: String,
    api_key: String,
    staff: StaffContext,
}

impl StockroomClient {
    /// Create a new stockroom client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the stockroom service (e.g., `"http://stockroom:8080"`)
    /// * `api_key` - Gateway API key
    /// * `staff` - The acting staff member's identity
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, staff: StaffContext) -> Self {
        Self::with_options(base_url, api_key, staff, ClientOptions::default())
    }

    /// Create a new stockroom client with custom options.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with default settings).
    #[must_use]
    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        staff: StaffContext,
        options: ClientOptions,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            staff,
        }
    }

    /// Receive stock into the ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn receive_stock(
        &self,
        entries: Vec<StockMovementEntry>,
    ) -> Result<StockMovementResponse, ClientError> {
        self.post_movements("receive", entries).await
    }

    /// Withdraw stock from the ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn withdraw_stock(
        &self,
        entries: Vec<StockMovementEntry>,
    ) -> Result<StockMovementResponse, ClientError> {
        self.post_movements("withdraw", entries).await
    }

    /// Check out stock to the acting staff member.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn borrow_item(
        &self,
        request: BorrowItemRequest,
    ) -> Result<BorrowTransaction, ClientError> {
        let url = format!("{}/v1/borrows", self.base_url);
        let response = self.identified(self.client.post(&url)).json(&request).send().await?;
        self.handle_response(response).await
    }

    /// Check a loan back in by its public token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn return_item(&self, token: &str) -> Result<BorrowTransaction, ClientError> {
        let url = format!("{}/v1/borrows/{token}/return", self.base_url);
        let response = self.identified(self.client.post(&url)).send().await?;
        self.handle_response(response).await
    }

    /// The acting staff member's borrow history, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn history(&self) -> Result<HistoryResponse, ClientError> {
        let url = format!("{}/v1/borrows/history", self.base_url);
        let response = self.identified(self.client.get(&url)).send().await?;
        self.handle_response(response).await
    }

    /// Get an item together with its balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_item(&self, code: &str) -> Result<ItemWithBalance, ClientError> {
        let url = format!("{}/v1/items/{code}", self.base_url);
        let response = self.identified(self.client.get(&url)).send().await?;
        self.handle_response(response).await
    }

    /// List audit entries, optionally filtered by item code.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn audit_logs(
        &self,
        item_code: Option<&str>,
    ) -> Result<AuditLogsResponse, ClientError> {
        let url = format!("{}/v1/audit-logs", self.base_url);
        let mut request = self.identified(self.client.get(&url));
        if let Some(code) = item_code {
            request = request.query(&[("item_code", code)]);
        }
        let response = request.send().await?;
        self.handle_response(response).await
    }

    async fn post_movements(
        &self,
        kind: &str,
        entries: Vec<StockMovementEntry>,
    ) -> Result<StockMovementResponse, ClientError> {
        let url = format!("{}/v1/stock/{kind}", self.base_url);
        let request = StockMovementRequest { entries };
        let response = self.identified(self.client.post(&url)).json(&request).send().await?;
        self.handle_response(response).await
    }

    /// Attach the gateway key and staff identity headers.
    fn identified(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder
            .header("x-api-key", &self.api_key)
            .header("x-staff-id", &self.staff.staff_id)
            .header("x-staff-name", &self.staff.name);
        match &self.staff.email {
            Some(email) => builder.header("x-staff-email", email),
            None => builder,
        }
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let code = api_error.error.code.as_str();
                let message = api_error.error.message;

                // Map specific error codes to typed errors
                match code {
                    "insufficient_stock" => {
                        let detail = |key: &str| {
                            api_error
                                .error
                                .details
                                .as_ref()
                                .and_then(|d| d.get(key))
                                .and_then(serde_json::Value::as_i64)
                                .unwrap_or(0)
                        };
                        Err(ClientError::InsufficientStock {
                            balance: detail("balance"),
                            requested: detail("requested"),
                        })
                    }
                    "not_found" => Err(ClientError::NotFound { message }),
                    "conflict" => Err(ClientError::Conflict { message }),
                    _ => Err(ClientError::Api {
                        code: code.to_string(),
                        message,
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

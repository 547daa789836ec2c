//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{audit, borrows, health, items, notifications, stock};
use crate::state::AppState;

// ============================================================================
// Concurrency Limiting Constants
// ============================================================================

/// Maximum concurrent requests for stock movement endpoints, which accept
/// batches from receiving/issuing desks.
const STOCK_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Catalog seam (gateway identity headers)
/// - `POST /v1/items` - Register item with zeroed balance
/// - `GET /v1/items/:code` - Item + balance lookup
/// - `DELETE /v1/items/:code` - Remove item (loan history untouched)
///
/// ## Stock movements (gateway identity headers, batch, rate-limited)
/// - `POST /v1/stock/receive` - Receive stock
/// - `POST /v1/stock/withdraw` - Withdraw stock
///
/// ## Loans (gateway identity headers)
/// - `POST /v1/borrows` - Check out stock
/// - `POST /v1/borrows/:id/return` - Check a loan back in
/// - `GET /v1/borrows/history` - Caller's borrow history
///
/// ## Audit & notifications (gateway identity headers)
/// - `GET /v1/audit-logs` - Audit trail, optional `item_code` filter
/// - `GET /v1/notifications` - Caller's inbox incl. broadcasts
/// - `POST /v1/notifications/:id/read` - Mark read
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    // Stock movement routes get their own, higher concurrency limit: the
    // receiving desk submits batches in bursts.
    let stock_routes = Router::new()
        .route("/receive", post(stock::receive_stock))
        .route("/withdraw", post(stock::withdraw_stock))
        .layer(ConcurrencyLimitLayer::new(STOCK_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Catalog seam
        .route("/items", post(items::register_item))
        .route("/items/:code", get(items::get_item))
        .route("/items/:code", delete(items::delete_item))
        // Loans
        .route("/borrows", post(borrows::borrow_item))
        .route("/borrows/:id/return", post(borrows::return_item))
        .route("/borrows/history", get(borrows::history))
        // Audit trail
        .route("/audit-logs", get(audit::list_audit_logs))
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/:id/read", post(notifications::mark_read))
        // Stock routes (with their own concurrency limit)
        .nest("/stock", stock_routes)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        // API v1 routes (rate limited)
        .nest("/v1", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

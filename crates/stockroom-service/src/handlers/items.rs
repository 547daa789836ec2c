//! Item catalog seam handlers.
//!
//! The ledger only needs registration, lookup, and deletion; the rest of
//! catalog management (renames, search, dashboards) lives elsewhere.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use stockroom_core::{Item, ItemCode, StockBalance};

use crate::auth::StaffIdentity;
use crate::error::ApiError;
use crate::state::AppState;

/// Item registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterItemRequest {
    /// Unique, immutable business key.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Category label.
    pub category: String,
    /// Unit of measure.
    pub unit: String,
}

/// Item plus its current balance.
#[derive(Debug, Serialize)]
pub struct ItemWithBalanceResponse {
    /// The catalog item.
    pub item: Item,
    /// Its balance row.
    pub balance: StockBalance,
}

/// Register an item with a zeroed balance row.
pub async fn register_item(
    State(state): State<Arc<AppState>>,
    identity: StaffIdentity,
    Json(body): Json<RegisterItemRequest>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let code: ItemCode = body
        .code
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid item code".into()))?;

    let item = Item::new(code, body.name, body.category, body.unit);
    state.store.register_item(&item).await?;

    tracing::info!(
        item_code = %item.code,
        actor = %identity.name,
        "Item registered"
    );

    Ok((StatusCode::CREATED, Json(item)))
}

/// Get an item together with its balance.
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    _identity: StaffIdentity,
    Path(code): Path<String>,
) -> Result<Json<ItemWithBalanceResponse>, ApiError> {
    let code: ItemCode = code
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid item code".into()))?;

    let (item, balance) = state
        .store
        .get_item_with_balance(&code)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("item not found: {code}")))?;

    Ok(Json(ItemWithBalanceResponse { item, balance }))
}

/// Delete an item and its balance row. Loan history stays intact;
/// outstanding loans of the item can still be returned.
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    identity: StaffIdentity,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    let code: ItemCode = code
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid item code".into()))?;

    state.store.delete_item(&code).await?;

    tracing::info!(
        item_code = %code,
        actor = %identity.name,
        "Item deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

//! Audit log read handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use stockroom_core::{AuditEntry, ItemCode};

use crate::auth::StaffIdentity;
use crate::error::ApiError;
use crate::state::AppState;

/// Default page size for audit listings.
const DEFAULT_AUDIT_PAGE_SIZE: usize = 50;

/// Maximum page size for audit listings.
const MAX_AUDIT_PAGE_SIZE: usize = 500;

/// Audit listing query parameters.
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    /// Restrict to one item code.
    pub item_code: Option<String>,
    /// Page size (default 50, capped at 500).
    pub limit: Option<usize>,
    /// Page offset.
    pub offset: Option<usize>,
}

/// Audit listing response.
#[derive(Debug, Serialize)]
pub struct AuditLogsResponse {
    /// Matching entries, newest first.
    pub entries: Vec<AuditEntry>,
}

/// List audit entries, newest first, optionally filtered by item code.
pub async fn list_audit_logs(
    State(state): State<Arc<AppState>>,
    _identity: StaffIdentity,
    Query(query): Query<AuditQuery>,
) -> Result<Json<AuditLogsResponse>, ApiError> {
    let item_code = query
        .item_code
        .map(|code| {
            code.parse::<ItemCode>()
                .map_err(|_| ApiError::BadRequest("Invalid item code".into()))
        })
        .transpose()?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_AUDIT_PAGE_SIZE)
        .min(MAX_AUDIT_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);

    let entries = state
        .store
        .list_audit_entries(item_code.as_ref(), limit, offset)
        .await?;

    Ok(Json(AuditLogsResponse { entries }))
}

//! Notification retrieval handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use stockroom_core::{InboxItem, NotificationId};

use crate::auth::StaffIdentity;
use crate::error::ApiError;
use crate::state::AppState;

/// Default page size for inbox listings.
const DEFAULT_INBOX_PAGE_SIZE: usize = 50;

/// Inbox query parameters.
#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    /// Page size (default 50).
    pub limit: Option<usize>,
    /// Page offset.
    pub offset: Option<usize>,
}

/// Inbox response.
#[derive(Debug, Serialize)]
pub struct InboxResponse {
    /// Direct notifications plus broadcasts, newest first, with the
    /// caller's read flags.
    pub notifications: Vec<InboxItem>,
}

/// List the calling staff member's notifications.
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    identity: StaffIdentity,
    Query(query): Query<InboxQuery>,
) -> Result<Json<InboxResponse>, ApiError> {
    let notifications = state
        .store
        .list_inbox(
            &identity.staff_id,
            query.limit.unwrap_or(DEFAULT_INBOX_PAGE_SIZE),
            query.offset.unwrap_or(0),
        )
        .await?;

    Ok(Json(InboxResponse { notifications }))
}

/// Mark one notification read for the calling staff member (idempotent).
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    identity: StaffIdentity,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let notification_id: NotificationId = id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid notification ID".into()))?;

    state
        .store
        .mark_notification_read(&notification_id, &identity.staff_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

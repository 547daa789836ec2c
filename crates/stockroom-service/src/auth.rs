//! Identity extraction.
//!
//! Authentication itself happens upstream: the gateway authenticates staff
//! and forwards their identity as headers, optionally proving itself with a
//! shared API key. This module only extracts and validates that context.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use stockroom_core::StaffId;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the gateway's shared API key.
const API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the acting staff member's ID.
const STAFF_ID_HEADER: &str = "x-staff-id";

/// Header carrying the acting staff member's display name.
const STAFF_NAME_HEADER: &str = "x-staff-name";

/// Header carrying the acting staff member's email (optional).
const STAFF_EMAIL_HEADER: &str = "x-staff-email";

/// The acting staff member, as forwarded by the auth gateway.
#[derive(Debug, Clone)]
pub struct StaffIdentity {
    /// The staff member's ID.
    pub staff_id: StaffId,

    /// Display name, used as the audit actor and loan recorder.
    pub name: String,

    /// Email address, used as the reminder recipient when present.
    pub email: Option<String>,
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for StaffIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Gateway proof first, when configured.
        if let Some(expected) = &state.config.gateway_api_key {
            let presented = parts
                .headers
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .ok_or(ApiError::Unauthorized)?;
            if presented != expected {
                return Err(ApiError::Unauthorized);
            }
        }

        let staff_id = parts
            .headers
            .get(STAFF_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?
            .parse::<StaffId>()
            .map_err(|_| ApiError::Unauthorized)?;

        let name = parts
            .headers
            .get(STAFF_NAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|n| !n.is_empty())
            .ok_or(ApiError::Unauthorized)?
            .to_string();

        let email = parts
            .headers
            .get(STAFF_EMAIL_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|e| !e.is_empty())
            .map(String::from);

        Ok(Self {
            staff_id,
            name,
            email,
        })
    }
}

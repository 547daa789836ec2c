//! Notification types.
//!
//! A notification is either addressed to one staff member or broadcast to
//! everyone (`staff_id = None`). Read state is tracked per
//! (notification, staff) pair so a single broadcast has independent read
//! state per recipient.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{NotificationId, StaffId};

/// The kind of notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Due-date reminder for an outstanding loan.
    Reminder,

    /// Informational message.
    Info,

    /// Something needs attention.
    Warning,
}

impl NotificationKind {
    /// Kind name as persisted.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reminder => "reminder",
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }

    /// Parse a persisted kind name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reminder" => Some(Self::Reminder),
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            _ => None,
        }
    }
}

/// A persisted notification record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification ID.
    pub id: NotificationId,

    /// Target staff member; `None` means broadcast to all.
    pub staff_id: Option<StaffId>,

    /// Short title.
    pub title: String,

    /// Message body.
    pub message: String,

    /// Notification kind.
    pub kind: NotificationKind,

    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create a notification addressed to one staff member.
    #[must_use]
    pub fn direct(staff_id: StaffId, title: String, message: String, kind: NotificationKind) -> Self {
        Self {
            id: NotificationId::generate(),
            staff_id: Some(staff_id),
            title,
            message,
            kind,
            created_at: Utc::now(),
        }
    }

    /// Create a broadcast notification visible to all staff.
    #[must_use]
    pub fn broadcast(title: String, message: String, kind: NotificationKind) -> Self {
        Self {
            id: NotificationId::generate(),
            staff_id: None,
            title,
            message,
            kind,
            created_at: Utc::now(),
        }
    }

    /// Whether this notification is a broadcast.
    #[must_use]
    pub const fn is_broadcast(&self) -> bool {
        self.staff_id.is_none()
    }
}

/// A notification paired with one recipient's read flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxItem {
    /// The notification record.
    pub notification: Notification,

    /// Whether this recipient has marked it read.
    pub read: bool,
}

//! Reminder scheduling.
//!
//! The engine only depends on the [`ReminderScheduler`] contract: persist
//! one fire-once job at a computed instant and hand back a job handle. The
//! at-least-once runner that eventually executes the job is an external
//! collaborator; when it fires it calls [`deliver`] with the stored payload.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use stockroom_core::{BorrowId, LedgerError, Notification, NotificationKind, StaffId};

use crate::notify::{EmailSender, NotificationDispatcher};

/// Opaque handle of a scheduled job, stored on the borrow record for
/// possible future cancellation (not currently exercised).
pub type JobHandle = String;

/// The rendered notification a reminder job carries.
///
/// Rendering happens at borrow time so the job runner needs no catalog or
/// loan lookups to send the email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderPayload {
    /// Recipient email address.
    pub to: String,

    /// Email subject.
    pub subject: String,

    /// Email HTML body.
    pub html_body: String,

    /// The borrowing staff member (also receives the in-app notification).
    pub staff_id: StaffId,

    /// The loan this reminder is about.
    pub borrow_id: BorrowId,
}

/// Scheduler contract: durable, fire-once, at-least-once at or after the
/// given instant.
#[async_trait]
pub trait ReminderScheduler: Send + Sync {
    /// Persist one fire-once job.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Scheduling`] if the job cannot be persisted.
    async fn schedule_once(
        &self,
        fire_at: DateTime<Utc>,
        payload: ReminderPayload,
    ) -> Result<JobHandle, LedgerError>;
}

/// PostgreSQL-backed scheduler: one pending row per job, durable across
/// restarts. The external runner drains rows whose `fire_at` has passed.
pub struct PgJobScheduler {
    pool: PgPool,
}

impl PgJobScheduler {
    /// Create a scheduler writing to the given pool's `scheduled_jobs` table.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderScheduler for PgJobScheduler {
    async fn schedule_once(
        &self,
        fire_at: DateTime<Utc>,
        payload: ReminderPayload,
    ) -> Result<JobHandle, LedgerError> {
        let id = uuid::Uuid::new_v4();
        let body = serde_json::to_value(&payload)
            .map_err(|e| LedgerError::Scheduling(e.to_string()))?;
        let now = Utc::now();

        sqlx::query(
            r"
            INSERT INTO scheduled_jobs (id, status, fire_at, payload, reference_id, created_at, updated_at)
            VALUES ($1, 'pending', $2, $3, $4, $5, $5)
            ",
        )
        .bind(id)
        .bind(fire_at)
        .bind(body)
        .bind(payload.borrow_id.as_str())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Scheduling(e.to_string()))?;

        tracing::debug!(
            job_id = %id,
            borrow_id = %payload.borrow_id,
            fire_at = %fire_at,
            "Reminder job scheduled"
        );

        Ok(id.to_string())
    }
}

/// In-memory scheduler: records every call instead of persisting it.
///
/// Non-durable; used by tests (to assert on scheduled reminders) and by the
/// DB-less development mode.
#[derive(Default)]
pub struct RecordingScheduler {
    calls: Mutex<Vec<(DateTime<Utc>, ReminderPayload)>>,
}

impl RecordingScheduler {
    /// Create an empty recording scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every `schedule_once` call so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn scheduled(&self) -> Vec<(DateTime<Utc>, ReminderPayload)> {
        self.calls.lock().expect("scheduler lock poisoned").clone()
    }
}

#[async_trait]
impl ReminderScheduler for RecordingScheduler {
    async fn schedule_once(
        &self,
        fire_at: DateTime<Utc>,
        payload: ReminderPayload,
    ) -> Result<JobHandle, LedgerError> {
        let mut calls = self
            .calls
            .lock()
            .map_err(|_| LedgerError::Scheduling("scheduler lock poisoned".to_string()))?;
        calls.push((fire_at, payload));
        Ok(format!("recorded-{}", calls.len()))
    }
}

/// Execute one fired reminder: send the email and persist the in-app
/// notification. This is the entry point the external job runner invokes
/// when a job's fire time arrives.
///
/// # Errors
///
/// Propagates email and dispatch failures so the runner's retry policy can
/// take over.
pub async fn deliver(
    payload: &ReminderPayload,
    email: &dyn EmailSender,
    dispatcher: &dyn NotificationDispatcher,
) -> Result<(), LedgerError> {
    email
        .send_email(&payload.to, &payload.subject, &payload.html_body)
        .await?;

    dispatcher
        .notify(Notification::direct(
            payload.staff_id,
            payload.subject.clone(),
            format!("Reminder for loan {}", payload.borrow_id),
            NotificationKind::Reminder,
        ))
        .await?;

    tracing::info!(
        borrow_id = %payload.borrow_id,
        staff_id = %payload.staff_id,
        "Reminder delivered"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::StoreDispatcher;
    use std::sync::Arc;
    use stockroom_store::{MemoryStore, Store};

    #[derive(Default)]
    struct RecordingEmailSender {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl EmailSender for RecordingEmailSender {
        async fn send_email(
            &self,
            to: &str,
            subject: &str,
            _html_body: &str,
        ) -> Result<(), LedgerError> {
            self.sent
                .lock()
                .expect("lock poisoned")
                .push((to.to_string(), subject.to_string()));
            Ok(())
        }
    }

    fn payload(staff_id: StaffId) -> ReminderPayload {
        ReminderPayload {
            to: "alex@example.test".into(),
            subject: "Return due for Cordless drill".into(),
            html_body: "<p>due</p>".into(),
            staff_id,
            borrow_id: BorrowId::generate(),
        }
    }

    #[tokio::test]
    async fn recording_scheduler_captures_calls_in_order() {
        let scheduler = RecordingScheduler::new();
        let staff = StaffId::generate();

        let first = scheduler
            .schedule_once(Utc::now(), payload(staff))
            .await
            .unwrap();
        let second = scheduler
            .schedule_once(Utc::now(), payload(staff))
            .await
            .unwrap();

        assert_eq!(first, "recorded-1");
        assert_eq!(second, "recorded-2");
        assert_eq!(scheduler.scheduled().len(), 2);
    }

    #[tokio::test]
    async fn deliver_sends_email_and_persists_notification() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = StoreDispatcher::new(Arc::clone(&store) as Arc<dyn Store>);
        let email = RecordingEmailSender::default();
        let staff = StaffId::generate();

        deliver(&payload(staff), &email, &dispatcher).await.unwrap();

        {
            let sent = email.sent.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].0, "alex@example.test");
        }

        let inbox = store.list_inbox(&staff, 10, 0).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(
            inbox[0].notification.kind,
            NotificationKind::Reminder
        );
        assert!(!inbox[0].read);
    }
}

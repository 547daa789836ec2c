//! Notification dispatch interfaces.
//!
//! The dispatcher persists notification records and is the seam where a
//! real-time push transport hangs; the push itself (and actual email
//! delivery) are external collaborators, so the in-repo implementations
//! persist and log.

use std::sync::Arc;

use async_trait::async_trait;

use stockroom_core::{LedgerError, Notification};
use stockroom_store::Store;

/// Pushes notifications to staff and persists them for later retrieval.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Dispatch one notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    async fn notify(&self, notification: Notification) -> Result<(), LedgerError>;
}

/// Sends an email to one recipient. Invoked by the scheduled job runner,
/// never synchronously by the ledger itself.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send one email.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be handed to the mail
    /// transport.
    async fn send_email(&self, to: &str, subject: &str, html_body: &str)
        -> Result<(), LedgerError>;
}

/// Dispatcher that persists notifications through the store and emits a
/// tracing event where the real-time push would fan out.
pub struct StoreDispatcher {
    store: Arc<dyn Store>,
}

impl StoreDispatcher {
    /// Create a dispatcher persisting through the given store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NotificationDispatcher for StoreDispatcher {
    async fn notify(&self, notification: Notification) -> Result<(), LedgerError> {
        self.store.put_notification(&notification).await?;
        tracing::info!(
            notification_id = %notification.id,
            staff_id = ?notification.staff_id,
            kind = %notification.kind.as_str(),
            title = %notification.title,
            "Notification dispatched"
        );
        Ok(())
    }
}

/// Email sender that only logs; real delivery is an external concern.
#[derive(Default)]
pub struct LogEmailSender;

impl LogEmailSender {
    /// Create a logging email sender.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        _html_body: &str,
    ) -> Result<(), LedgerError> {
        tracing::info!(to = %to, subject = %subject, "Email handed to transport");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::{NotificationKind, StaffId};
    use stockroom_store::MemoryStore;

    #[tokio::test]
    async fn store_dispatcher_persists_the_record() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = StoreDispatcher::new(Arc::clone(&store) as Arc<dyn Store>);
        let staff = StaffId::generate();

        dispatcher
            .notify(stockroom_core::Notification::direct(
                staff,
                "Checkout recorded".into(),
                "2 × Cordless drill checked out".into(),
                NotificationKind::Info,
            ))
            .await
            .unwrap();

        let inbox = store.list_inbox(&staff, 10, 0).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].notification.title, "Checkout recorded");
    }

    #[tokio::test]
    async fn log_email_sender_accepts_messages() {
        LogEmailSender::new()
            .send_email("alex@example.test", "Return due", "<p>due</p>")
            .await
            .unwrap();
    }
}

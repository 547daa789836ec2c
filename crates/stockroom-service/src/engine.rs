//! The borrow/return engine.
//!
//! Orchestrates checkouts and check-ins on top of the store's compound
//! operations: item lookup, strict due-date parsing, civil-time stamping,
//! the atomic balance-debit-plus-record write, and reminder scheduling.
//! Lifecycle per transaction is `Borrowed -> Returned`, nothing else.

use std::sync::Arc;

use chrono::Utc;

use stockroom_core::{
    parse_due_date, reminder_fire_time, BorrowId, BorrowTransaction, CivilClock, ItemCode,
    LedgerError, StaffId,
};
use stockroom_store::Store;

use crate::scheduler::{ReminderPayload, ReminderScheduler};

/// A checkout request as collected by the handler layer.
#[derive(Debug, Clone)]
pub struct BorrowRequest {
    /// The borrowing staff member.
    pub staff_id: StaffId,

    /// Display name of the staff member recording the checkout.
    pub recorder_name: String,

    /// Email of the recorder; reminder scheduling is skipped when empty.
    pub recorder_email: Option<String>,

    /// The item to borrow.
    pub item_code: ItemCode,

    /// Quantity to borrow.
    pub quantity: i64,

    /// Optional caller-supplied job reference.
    pub job_ref: Option<String>,

    /// Optional due date, strict `dd/MM/yyyy`.
    pub due_date: Option<String>,

    /// Optional free-form note.
    pub note: Option<String>,
}

/// The borrow/return engine.
pub struct BorrowEngine {
    store: Arc<dyn Store>,
    scheduler: Arc<dyn ReminderScheduler>,
    clock: CivilClock,
}

impl BorrowEngine {
    /// Create an engine over the given collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        scheduler: Arc<dyn ReminderScheduler>,
        clock: CivilClock,
    ) -> Self {
        Self {
            store,
            scheduler,
            clock,
        }
    }

    /// Check out stock to a staff member.
    ///
    /// The balance debit, audit entry, and transaction record commit as one
    /// unit. If a due date and recorder email are present, a reminder job
    /// is scheduled afterwards, but only when the computed fire time is
    /// still in the future; a past checkpoint is skipped silently.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::ItemNotFound`] if the item or its balance row is
    ///   absent
    /// - [`LedgerError::InvalidDueDate`] if the due date string is
    ///   malformed
    /// - [`LedgerError::InsufficientStock`] if the debit would drive the
    ///   balance negative
    pub async fn borrow(&self, request: BorrowRequest) -> Result<BorrowTransaction, LedgerError> {
        let (item, _balance) = self
            .store
            .get_item_with_balance(&request.item_code)
            .await?
            .ok_or_else(|| LedgerError::ItemNotFound {
                item_code: request.item_code.to_string(),
            })?;

        let due_date = request
            .due_date
            .as_deref()
            .map(parse_due_date)
            .transpose()?;

        let now_civil = self.clock.now();

        let mut transaction = BorrowTransaction::checkout(
            request.staff_id,
            request.recorder_name,
            request.item_code,
            item.name,
            request.quantity,
            now_civil.with_timezone(&Utc),
        );
        if let Some(due) = due_date {
            transaction = transaction.with_due_date(due);
        }
        if let Some(job_ref) = request.job_ref {
            transaction = transaction.with_job_ref(job_ref);
        }
        if let Some(note) = request.note {
            transaction = transaction.with_note(note);
        }

        let (old_balance, new_balance) = self.store.record_borrow(&transaction).await?;

        tracing::info!(
            borrow_id = %transaction.id,
            staff_id = %transaction.staff_id,
            item_code = %transaction.item_code,
            quantity = %transaction.quantity,
            old_balance = %old_balance,
            new_balance = %new_balance,
            "Checkout recorded"
        );

        let recorder_email = request.recorder_email.filter(|email| !email.is_empty());
        if let (Some(email), Some(due)) = (recorder_email, due_date) {
            let fire_at = self.clock.to_instant(reminder_fire_time(now_civil, due));
            if fire_at > Utc::now() {
                let payload = render_reminder(&transaction, &email);
                let handle = self.scheduler.schedule_once(fire_at, payload).await?;
                self.store.attach_job_handle(&transaction.id, &handle).await?;
                transaction.scheduled_job = Some(handle);
            } else {
                tracing::debug!(
                    borrow_id = %transaction.id,
                    fire_at = %fire_at,
                    "Computed reminder time already past, skipping"
                );
            }
        }

        Ok(transaction)
    }

    /// Check a loan back in.
    ///
    /// The balance restore (best-effort: skipped if the item was deleted
    /// after checkout), RETURN audit entry, and status flip commit as one
    /// unit.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::BorrowNotFound`] if the token is unknown
    /// - [`LedgerError::AlreadyReturned`] if the loan was already checked
    ///   back in (state is left unchanged)
    pub async fn return_loan(
        &self,
        borrow_id: &BorrowId,
        recorder_name: &str,
    ) -> Result<BorrowTransaction, LedgerError> {
        let returned_at = self.clock.now().with_timezone(&Utc);
        let transaction = self
            .store
            .complete_return(borrow_id, returned_at, recorder_name)
            .await?;

        tracing::info!(
            borrow_id = %transaction.id,
            staff_id = %transaction.staff_id,
            item_code = %transaction.item_code,
            "Loan checked back in"
        );

        Ok(transaction)
    }

    /// A staff member's borrow history, newest first. Read-only.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lookup fails.
    pub async fn history(&self, staff_id: &StaffId) -> Result<Vec<BorrowTransaction>, LedgerError> {
        Ok(self.store.list_borrows_by_staff(staff_id).await?)
    }
}

/// Render the reminder email at borrow time so the job runner needs no
/// further lookups.
fn render_reminder(transaction: &BorrowTransaction, email: &str) -> ReminderPayload {
    let due = transaction
        .due_date
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default();

    ReminderPayload {
        to: email.to_string(),
        subject: format!("Return due for {}", transaction.item_name),
        html_body: format!(
            "<p>Loan <strong>{}</strong>: {} × {} is due back on <strong>{}</strong>.</p>",
            transaction.id, transaction.quantity, transaction.item_name, due
        ),
        staff_id: transaction.staff_id,
        borrow_id: transaction.id.clone(),
    }
}

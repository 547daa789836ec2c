//! Storage layer for the stockroom inventory ledger.
//!
//! This crate provides durable storage for the item catalog seam, stock
//! balances, the append-only audit log, borrow transactions, and
//! notifications.
//!
//! # Backends
//!
//! - [`PgStore`]: the production PostgreSQL backend. Every compound
//!   operation runs in one database transaction with the balance row locked
//!   `FOR UPDATE`, so concurrent withdrawals against the same item
//!   serialize instead of losing updates.
//! - [`MemoryStore`]: an in-memory backend for tests and local development;
//!   a single state lock gives the same all-or-nothing semantics.
//!
//! # Atomicity
//!
//! Balance mutations never stand alone: each compound operation pairs the
//! balance update with its audit entry (and, for borrows/returns, the
//! transaction record) inside one commit. All quantity arithmetic funnels
//! through [`stockroom_core::StockBalance::apply`], so the non-negativity
//! guard cannot be bypassed by any backend.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockroom_core::{
    AuditEntry, BorrowId, BorrowTransaction, InboxItem, Item, ItemCode, Notification,
    NotificationId, StaffId, StockAction, StockBalance,
};

/// The storage trait defining all ledger persistence operations.
///
/// This trait abstracts the storage layer, allowing different
/// implementations (PostgreSQL in production, in-memory for testing).
#[async_trait]
pub trait Store: Send + Sync {
    // =========================================================================
    // Catalog seam
    // =========================================================================

    /// Register an item together with its zeroed balance row.
    ///
    /// Both inserts commit as one unit.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the item code is taken.
    async fn register_item(&self, item: &Item) -> Result<()>;

    /// Get an item and its balance row by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_item_with_balance(
        &self,
        item_code: &ItemCode,
    ) -> Result<Option<(Item, StockBalance)>>;

    /// Delete an item and its balance row.
    ///
    /// Borrow history and audit entries referencing the code are left
    /// untouched; outstanding loans of a deleted item can still be returned
    /// (the balance restore is then skipped).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the item doesn't exist.
    async fn delete_item(&self, item_code: &ItemCode) -> Result<()>;

    // =========================================================================
    // Ledger mutations (compound, atomic)
    // =========================================================================

    /// Adjust an item's balance and append the documenting audit entry, as
    /// one atomic unit. Returns `(old_balance, new_balance)`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the item or its balance row is
    /// absent, and `StoreError::InsufficientStock` if a debit would drive
    /// the balance negative (nothing is written in either case).
    async fn apply_stock_movement(
        &self,
        item_code: &ItemCode,
        action: StockAction,
        quantity: i64,
        actor: &str,
    ) -> Result<(i64, i64)>;

    // =========================================================================
    // Borrow lifecycle
    // =========================================================================

    /// Persist a checkout: debit the balance, append the BORROW audit entry,
    /// and insert the borrow transaction, all in one commit. Returns
    /// `(old_balance, new_balance)`.
    ///
    /// # Errors
    ///
    /// As [`Store::apply_stock_movement`]; if the transaction record cannot
    /// be inserted the balance debit rolls back with it.
    async fn record_borrow(&self, transaction: &BorrowTransaction) -> Result<(i64, i64)>;

    /// Attach the scheduled reminder job's handle to a borrow transaction.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the transaction doesn't exist.
    async fn attach_job_handle(&self, borrow_id: &BorrowId, handle: &str) -> Result<()>;

    /// Check a loan back in: restore the balance (skipped without error if
    /// the item has since been deleted), append the RETURN audit entry, and
    /// flip the transaction to returned, all in one commit. Returns the
    /// updated transaction.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the transaction doesn't exist and
    /// `StoreError::AlreadyReturned` if it was already checked back in
    /// (state is left unchanged).
    async fn complete_return(
        &self,
        borrow_id: &BorrowId,
        returned_at: DateTime<Utc>,
        actor: &str,
    ) -> Result<BorrowTransaction>;

    /// Get a borrow transaction by its public token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_borrow(&self, borrow_id: &BorrowId) -> Result<Option<BorrowTransaction>>;

    /// List a staff member's borrow transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_borrows_by_staff(&self, staff_id: &StaffId) -> Result<Vec<BorrowTransaction>>;

    // =========================================================================
    // Audit log (read side)
    // =========================================================================

    /// List audit entries, newest first, optionally filtered by item code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_audit_entries(
        &self,
        item_code: Option<&ItemCode>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<AuditEntry>>;

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Persist a notification record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn put_notification(&self, notification: &Notification) -> Result<()>;

    /// List a staff member's inbox: direct notifications plus broadcasts,
    /// newest first, each with the recipient's read flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_inbox(
        &self,
        staff_id: &StaffId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<InboxItem>>;

    /// Mark a notification read for one staff member (idempotent).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the notification doesn't exist.
    async fn mark_notification_read(
        &self,
        notification_id: &NotificationId,
        staff_id: &StaffId,
    ) -> Result<()>;
}

//! In-memory storage implementation.
//!
//! This backend keeps the whole ledger behind one mutex, which makes every
//! compound operation naturally all-or-nothing and serializes concurrent
//! mutations the way the PostgreSQL backend's row locks do. Intended for
//! tests and local development.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockroom_core::{
    AuditEntry, BalanceDelta, BorrowId, BorrowStatus, BorrowTransaction, InboxItem, Item, ItemCode,
    Notification, NotificationId, StaffId, StockAction, StockBalance,
};

use crate::error::{Result, StoreError};
use crate::Store;

/// In-memory ledger state.
#[derive(Default)]
struct State {
    items: HashMap<String, Item>,
    balances: HashMap<String, StockBalance>,
    borrows: HashMap<String, BorrowTransaction>,
    audit: Vec<AuditEntry>,
    notifications: Vec<Notification>,
    reads: HashSet<(NotificationId, StaffId)>,
}

impl State {
    /// The balance mutator: adjust one balance row and append the audit
    /// entry documenting the change. Callers are inside the state lock, so
    /// the pair is atomic.
    fn adjust(
        &mut self,
        item_code: &ItemCode,
        action: StockAction,
        quantity: i64,
        actor: &str,
    ) -> Result<(i64, i64)> {
        let balance = self
            .balances
            .get_mut(item_code.as_str())
            .ok_or_else(|| StoreError::NotFound {
                entity: "item",
                id: item_code.to_string(),
            })?;

        let (old_balance, new_balance) = balance
            .apply(action, quantity)
            .map_err(StoreError::from_mutator)?;

        let delta = BalanceDelta::for_action(action, quantity, new_balance);
        self.audit.push(AuditEntry::balance_mutation(
            action,
            item_code,
            old_balance,
            delta,
            actor.to_string(),
        ));

        Ok((old_balance, new_balance))
    }
}

/// In-memory storage backend.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<State>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Database("state lock poisoned".to_string()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    // =========================================================================
    // Catalog seam
    // =========================================================================

    async fn register_item(&self, item: &Item) -> Result<()> {
        let mut state = self.lock()?;
        let key = item.code.as_str().to_string();

        if state.items.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                entity: "item",
                id: key,
            });
        }

        state.items.insert(key.clone(), item.clone());
        state
            .balances
            .insert(key, StockBalance::new(item.code.clone()));
        Ok(())
    }

    async fn get_item_with_balance(
        &self,
        item_code: &ItemCode,
    ) -> Result<Option<(Item, StockBalance)>> {
        let state = self.lock()?;
        let pair = state
            .items
            .get(item_code.as_str())
            .cloned()
            .zip(state.balances.get(item_code.as_str()).cloned());
        Ok(pair)
    }

    async fn delete_item(&self, item_code: &ItemCode) -> Result<()> {
        let mut state = self.lock()?;
        if state.items.remove(item_code.as_str()).is_none() {
            return Err(StoreError::NotFound {
                entity: "item",
                id: item_code.to_string(),
            });
        }
        state.balances.remove(item_code.as_str());
        Ok(())
    }

    // =========================================================================
    // Ledger mutations
    // =========================================================================

    async fn apply_stock_movement(
        &self,
        item_code: &ItemCode,
        action: StockAction,
        quantity: i64,
        actor: &str,
    ) -> Result<(i64, i64)> {
        let mut state = self.lock()?;
        state.adjust(item_code, action, quantity, actor)
    }

    // =========================================================================
    // Borrow lifecycle
    // =========================================================================

    async fn record_borrow(&self, transaction: &BorrowTransaction) -> Result<(i64, i64)> {
        let mut state = self.lock()?;
        let key = transaction.id.as_str().to_string();

        if state.borrows.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                entity: "borrow transaction",
                id: key,
            });
        }

        let balances = state.adjust(
            &transaction.item_code,
            StockAction::Borrow,
            transaction.quantity,
            &transaction.recorder,
        )?;

        state.borrows.insert(key, transaction.clone());
        Ok(balances)
    }

    async fn attach_job_handle(&self, borrow_id: &BorrowId, handle: &str) -> Result<()> {
        let mut state = self.lock()?;
        let transaction =
            state
                .borrows
                .get_mut(borrow_id.as_str())
                .ok_or_else(|| StoreError::NotFound {
                    entity: "borrow transaction",
                    id: borrow_id.to_string(),
                })?;
        transaction.scheduled_job = Some(handle.to_string());
        Ok(())
    }

    async fn complete_return(
        &self,
        borrow_id: &BorrowId,
        returned_at: DateTime<Utc>,
        actor: &str,
    ) -> Result<BorrowTransaction> {
        let mut state = self.lock()?;

        let current = state
            .borrows
            .get(borrow_id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "borrow transaction",
                id: borrow_id.to_string(),
            })?;

        if current.is_returned() {
            return Err(StoreError::AlreadyReturned {
                borrow_id: borrow_id.to_string(),
            });
        }

        // Best-effort restore: a catalog deletion after checkout must not
        // block the return itself.
        if state.balances.contains_key(current.item_code.as_str()) {
            state.adjust(
                &current.item_code,
                StockAction::Return,
                current.quantity,
                actor,
            )?;
        } else {
            tracing::warn!(
                borrow_id = %borrow_id,
                item_code = %current.item_code,
                "Item deleted after checkout, skipping balance restore"
            );
        }

        let transaction = state
            .borrows
            .get_mut(borrow_id.as_str())
            .ok_or_else(|| StoreError::NotFound {
                entity: "borrow transaction",
                id: borrow_id.to_string(),
            })?;
        transaction.status = BorrowStatus::Returned;
        transaction.returned_at = Some(returned_at);

        Ok(transaction.clone())
    }

    async fn get_borrow(&self, borrow_id: &BorrowId) -> Result<Option<BorrowTransaction>> {
        let state = self.lock()?;
        Ok(state.borrows.get(borrow_id.as_str()).cloned())
    }

    async fn list_borrows_by_staff(&self, staff_id: &StaffId) -> Result<Vec<BorrowTransaction>> {
        let state = self.lock()?;
        let mut transactions: Vec<_> = state
            .borrows
            .values()
            .filter(|t| t.staff_id == *staff_id)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.borrowed_at.cmp(&a.borrowed_at));
        Ok(transactions)
    }

    // =========================================================================
    // Audit log
    // =========================================================================

    async fn list_audit_entries(
        &self,
        item_code: Option<&ItemCode>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<AuditEntry>> {
        let state = self.lock()?;
        Ok(state
            .audit
            .iter()
            .rev()
            .filter(|entry| item_code.map_or(true, |code| entry.record_id == code.as_str()))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    async fn put_notification(&self, notification: &Notification) -> Result<()> {
        let mut state = self.lock()?;
        state.notifications.push(notification.clone());
        Ok(())
    }

    async fn list_inbox(
        &self,
        staff_id: &StaffId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<InboxItem>> {
        let state = self.lock()?;
        Ok(state
            .notifications
            .iter()
            .rev()
            .filter(|n| n.staff_id.is_none() || n.staff_id == Some(*staff_id))
            .skip(offset)
            .take(limit)
            .map(|n| InboxItem {
                notification: n.clone(),
                read: state.reads.contains(&(n.id, *staff_id)),
            })
            .collect())
    }

    async fn mark_notification_read(
        &self,
        notification_id: &NotificationId,
        staff_id: &StaffId,
    ) -> Result<()> {
        let mut state = self.lock()?;
        if !state
            .notifications
            .iter()
            .any(|n| n.id == *notification_id)
        {
            return Err(StoreError::NotFound {
                entity: "notification",
                id: notification_id.to_string(),
            });
        }
        state.reads.insert((*notification_id, *staff_id));
        Ok(())
    }
}

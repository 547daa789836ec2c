//! PostgreSQL storage implementation.
//!
//! Every compound operation runs in a single database transaction; the
//! balance row is locked with `SELECT ... FOR UPDATE` before it is read, so
//! two concurrent withdrawals against the same item serialize and neither
//! can observe a stale balance. Dropping an uncommitted `sqlx` transaction
//! rolls it back, which gives rollback-on-error without compensating
//! writes.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

use stockroom_core::{
    AuditEntry, BalanceDelta, BorrowId, BorrowStatus, BorrowTransaction, InboxItem, Item, ItemCode,
    Notification, NotificationId, NotificationKind, StaffId, StockAction, StockBalance,
};

use crate::error::{Result, StoreError};
use crate::Store;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Maximum connections in the default pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// PostgreSQL-backed storage implementation.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database at `database_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Run the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails to apply.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// The underlying pool (shared with e.g. the job scheduler).
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// The balance mutator: lock one balance row, adjust it, and append the
    /// audit entry documenting the change, all on the caller's transaction.
    async fn adjust_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        item_code: &ItemCode,
        action: StockAction,
        quantity: i64,
        actor: &str,
    ) -> Result<(i64, i64)> {
        let row: Option<BalanceRow> = sqlx::query_as(
            r"
            SELECT item_code, total_quantity, received_qty, withdrawn_qty, balance, updated_at
            FROM stock_balances
            WHERE item_code = $1
            FOR UPDATE
            ",
        )
        .bind(item_code.as_str())
        .fetch_optional(&mut **tx)
        .await?;

        let mut balance = row
            .ok_or_else(|| StoreError::NotFound {
                entity: "item",
                id: item_code.to_string(),
            })?
            .into_core()?;

        let (old_balance, new_balance) = balance
            .apply(action, quantity)
            .map_err(StoreError::from_mutator)?;

        sqlx::query(
            r"
            UPDATE stock_balances
            SET total_quantity = $2, received_qty = $3, withdrawn_qty = $4,
                balance = $5, updated_at = $6
            WHERE item_code = $1
            ",
        )
        .bind(item_code.as_str())
        .bind(balance.total_quantity)
        .bind(balance.received_qty)
        .bind(balance.withdrawn_qty)
        .bind(balance.balance)
        .bind(balance.updated_at)
        .execute(&mut **tx)
        .await?;

        let entry = AuditEntry::balance_mutation(
            action,
            item_code,
            old_balance,
            BalanceDelta::for_action(action, quantity, new_balance),
            actor.to_string(),
        );
        Self::insert_audit_in_tx(tx, &entry).await?;

        Ok((old_balance, new_balance))
    }

    async fn insert_audit_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        entry: &AuditEntry,
    ) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO system_audit_logs
                (id, action, table_name, record_id, old_value, new_value, actor, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(entry.id.to_string())
        .bind(entry.action.as_str())
        .bind(&entry.table_name)
        .bind(&entry.record_id)
        .bind(&entry.old_value)
        .bind(&entry.new_value)
        .bind(&entry.actor)
        .bind(entry.created_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    // =========================================================================
    // Catalog seam
    // =========================================================================

    async fn register_item(&self, item: &Item) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r"
            INSERT INTO items (code, name, category, unit, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(item.code.as_str())
        .bind(&item.name)
        .bind(&item.category)
        .bind(&item.unit)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            if is_unique_violation(&e) {
                return Err(StoreError::AlreadyExists {
                    entity: "item",
                    id: item.code.to_string(),
                });
            }
            return Err(e.into());
        }

        sqlx::query(
            r"
            INSERT INTO stock_balances (item_code, total_quantity, received_qty, withdrawn_qty, balance, updated_at)
            VALUES ($1, 0, 0, 0, 0, $2)
            ",
        )
        .bind(item.code.as_str())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_item_with_balance(
        &self,
        item_code: &ItemCode,
    ) -> Result<Option<(Item, StockBalance)>> {
        let row: Option<ItemWithBalanceRow> = sqlx::query_as(
            r"
            SELECT i.code, i.name, i.category, i.unit, i.created_at, i.updated_at,
                   b.total_quantity, b.received_qty, b.withdrawn_qty, b.balance,
                   b.updated_at AS balance_updated_at
            FROM items i
            JOIN stock_balances b ON b.item_code = i.code
            WHERE i.code = $1
            ",
        )
        .bind(item_code.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ItemWithBalanceRow::into_core).transpose()
    }

    async fn delete_item(&self, item_code: &ItemCode) -> Result<()> {
        // stock_balances cascades from items.
        let result = sqlx::query("DELETE FROM items WHERE code = $1")
            .bind(item_code.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "item",
                id: item_code.to_string(),
            });
        }
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
        let mut tx = self.pool.begin().await?;
        let balances = Self::adjust_in_tx(&mut tx, item_code, action, quantity, actor).await?;
        tx.commit().await?;
        Ok(balances)
    }

    // =========================================================================
    // Borrow lifecycle
    // =========================================================================

    async fn record_borrow(&self, transaction: &BorrowTransaction) -> Result<(i64, i64)> {
        let mut tx = self.pool.begin().await?;

        let balances = Self::adjust_in_tx(
            &mut tx,
            &transaction.item_code,
            StockAction::Borrow,
            transaction.quantity,
            &transaction.recorder,
        )
        .await?;

        let inserted = sqlx::query(
            r"
            INSERT INTO borrow_transactions
                (id, staff_id, recorder, item_code, item_name, quantity, job_ref,
                 borrowed_at, due_date, returned_at, status, note, scheduled_job)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(transaction.id.as_str())
        .bind(transaction.staff_id.as_uuid())
        .bind(&transaction.recorder)
        .bind(transaction.item_code.as_str())
        .bind(&transaction.item_name)
        .bind(transaction.quantity)
        .bind(&transaction.job_ref)
        .bind(transaction.borrowed_at)
        .bind(transaction.due_date)
        .bind(transaction.returned_at)
        .bind(transaction.status.as_str())
        .bind(&transaction.note)
        .bind(&transaction.scheduled_job)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            if is_unique_violation(&e) {
                return Err(StoreError::AlreadyExists {
                    entity: "borrow transaction",
                    id: transaction.id.to_string(),
                });
            }
            return Err(e.into());
        }

        tx.commit().await?;
        Ok(balances)
    }

    async fn attach_job_handle(&self, borrow_id: &BorrowId, handle: &str) -> Result<()> {
        let result = sqlx::query("UPDATE borrow_transactions SET scheduled_job = $2 WHERE id = $1")
            .bind(borrow_id.as_str())
            .bind(handle)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "borrow transaction",
                id: borrow_id.to_string(),
            });
        }
        Ok(())
    }

    async fn complete_return(
        &self,
        borrow_id: &BorrowId,
        returned_at: DateTime<Utc>,
        actor: &str,
    ) -> Result<BorrowTransaction> {
        let mut tx = self.pool.begin().await?;

        let row: Option<BorrowRow> = sqlx::query_as(
            r"
            SELECT id, staff_id, recorder, item_code, item_name, quantity, job_ref,
                   borrowed_at, due_date, returned_at, status, note, scheduled_job
            FROM borrow_transactions
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(borrow_id.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let mut current = row
            .ok_or_else(|| StoreError::NotFound {
                entity: "borrow transaction",
                id: borrow_id.to_string(),
            })?
            .into_core()?;

        if current.is_returned() {
            return Err(StoreError::AlreadyReturned {
                borrow_id: borrow_id.to_string(),
            });
        }

        // Best-effort restore: a catalog deletion after checkout must not
        // block the return itself.
        match Self::adjust_in_tx(
            &mut tx,
            &current.item_code,
            StockAction::Return,
            current.quantity,
            actor,
        )
        .await
        {
            Ok(_) => {}
            Err(StoreError::NotFound { .. }) => {
                tracing::warn!(
                    borrow_id = %borrow_id,
                    item_code = %current.item_code,
                    "Item deleted after checkout, skipping balance restore"
                );
            }
            Err(e) => return Err(e),
        }

        sqlx::query("UPDATE borrow_transactions SET status = $2, returned_at = $3 WHERE id = $1")
            .bind(borrow_id.as_str())
            .bind(BorrowStatus::Returned.as_str())
            .bind(returned_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        current.status = BorrowStatus::Returned;
        current.returned_at = Some(returned_at);
        Ok(current)
    }

    async fn get_borrow(&self, borrow_id: &BorrowId) -> Result<Option<BorrowTransaction>> {
        let row: Option<BorrowRow> = sqlx::query_as(
            r"
            SELECT id, staff_id, recorder, item_code, item_name, quantity, job_ref,
                   borrowed_at, due_date, returned_at, status, note, scheduled_job
            FROM borrow_transactions
            WHERE id = $1
            ",
        )
        .bind(borrow_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(BorrowRow::into_core).transpose()
    }

    async fn list_borrows_by_staff(&self, staff_id: &StaffId) -> Result<Vec<BorrowTransaction>> {
        let rows: Vec<BorrowRow> = sqlx::query_as(
            r"
            SELECT id, staff_id, recorder, item_code, item_name, quantity, job_ref,
                   borrowed_at, due_date, returned_at, status, note, scheduled_job
            FROM borrow_transactions
            WHERE staff_id = $1
            ORDER BY borrowed_at DESC
            ",
        )
        .bind(staff_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BorrowRow::into_core).collect()
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
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        let rows: Vec<AuditRow> = if let Some(code) = item_code {
            sqlx::query_as(
                r"
                SELECT id, action, table_name, record_id, old_value, new_value, actor, created_at
                FROM system_audit_logs
                WHERE record_id = $1
                ORDER BY id DESC
                LIMIT $2 OFFSET $3
                ",
            )
            .bind(code.as_str())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(
                r"
                SELECT id, action, table_name, record_id, old_value, new_value, actor, created_at
                FROM system_audit_logs
                ORDER BY id DESC
                LIMIT $1 OFFSET $2
                ",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        };

        rows.into_iter().map(AuditRow::into_core).collect()
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    async fn put_notification(&self, notification: &Notification) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO notifications (id, staff_id, title, message, kind, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(notification.id.as_uuid())
        .bind(notification.staff_id.map(|s| *s.as_uuid()))
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.kind.as_str())
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_inbox(
        &self,
        staff_id: &StaffId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<InboxItem>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        let rows: Vec<InboxRow> = sqlx::query_as(
            r"
            SELECT n.id, n.staff_id, n.title, n.message, n.kind, n.created_at,
                   (r.staff_id IS NOT NULL) AS is_read
            FROM notifications n
            LEFT JOIN notification_reads r
                ON r.notification_id = n.id AND r.staff_id = $1
            WHERE n.staff_id IS NULL OR n.staff_id = $1
            ORDER BY n.created_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(staff_id.as_uuid())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(InboxRow::into_core).collect()
    }

    async fn mark_notification_read(
        &self,
        notification_id: &NotificationId,
        staff_id: &StaffId,
    ) -> Result<()> {
        let result = sqlx::query(
            r"
            INSERT INTO notification_reads (notification_id, staff_id, read_at)
            SELECT id, $2, $3 FROM notifications WHERE id = $1
            ON CONFLICT (notification_id, staff_id) DO NOTHING
            ",
        )
        .bind(notification_id.as_uuid())
        .bind(staff_id.as_uuid())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        // Zero rows means either already-read (fine) or unknown id; tell
        // them apart with an existence probe only in the zero case.
        if result.rows_affected() == 0 {
            let exists: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM notifications WHERE id = $1")
                .bind(notification_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;
            if exists.is_none() {
                return Err(StoreError::NotFound {
                    entity: "notification",
                    id: notification_id.to_string(),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct BalanceRow {
    item_code: String,
    total_quantity: i64,
    received_qty: i64,
    withdrawn_qty: i64,
    balance: i64,
    updated_at: DateTime<Utc>,
}

impl BalanceRow {
    fn into_core(self) -> Result<StockBalance> {
        Ok(StockBalance {
            item_code: parse_stored(&self.item_code)?,
            total_quantity: self.total_quantity,
            received_qty: self.received_qty,
            withdrawn_qty: self.withdrawn_qty,
            balance: self.balance,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ItemWithBalanceRow {
    code: String,
    name: String,
    category: String,
    unit: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    total_quantity: i64,
    received_qty: i64,
    withdrawn_qty: i64,
    balance: i64,
    balance_updated_at: DateTime<Utc>,
}

impl ItemWithBalanceRow {
    fn into_core(self) -> Result<(Item, StockBalance)> {
        let code: ItemCode = parse_stored(&self.code)?;
        let item = Item {
            code: code.clone(),
            name: self.name,
            category: self.category,
            unit: self.unit,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        let balance = StockBalance {
            item_code: code,
            total_quantity: self.total_quantity,
            received_qty: self.received_qty,
            withdrawn_qty: self.withdrawn_qty,
            balance: self.balance,
            updated_at: self.balance_updated_at,
        };
        Ok((item, balance))
    }
}

#[derive(sqlx::FromRow)]
struct BorrowRow {
    id: String,
    staff_id: uuid::Uuid,
    recorder: String,
    item_code: String,
    item_name: String,
    quantity: i64,
    job_ref: Option<String>,
    borrowed_at: DateTime<Utc>,
    due_date: Option<NaiveDate>,
    returned_at: Option<DateTime<Utc>>,
    status: String,
    note: Option<String>,
    scheduled_job: Option<String>,
}

impl BorrowRow {
    fn into_core(self) -> Result<BorrowTransaction> {
        let status = BorrowStatus::parse(&self.status).ok_or_else(|| {
            StoreError::Database(format!("unknown borrow status: {}", self.status))
        })?;
        Ok(BorrowTransaction {
            id: parse_stored(&self.id)?,
            staff_id: StaffId::from_uuid(self.staff_id),
            recorder: self.recorder,
            item_code: parse_stored(&self.item_code)?,
            item_name: self.item_name,
            quantity: self.quantity,
            job_ref: self.job_ref,
            borrowed_at: self.borrowed_at,
            due_date: self.due_date,
            returned_at: self.returned_at,
            status,
            note: self.note,
            scheduled_job: self.scheduled_job,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: String,
    action: String,
    table_name: String,
    record_id: String,
    old_value: String,
    new_value: String,
    actor: String,
    created_at: DateTime<Utc>,
}

impl AuditRow {
    fn into_core(self) -> Result<AuditEntry> {
        let action = StockAction::parse(&self.action)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(AuditEntry {
            id: parse_stored(&self.id)?,
            action,
            table_name: self.table_name,
            record_id: self.record_id,
            old_value: self.old_value,
            new_value: self.new_value,
            actor: self.actor,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct InboxRow {
    id: uuid::Uuid,
    staff_id: Option<uuid::Uuid>,
    title: String,
    message: String,
    kind: String,
    created_at: DateTime<Utc>,
    is_read: bool,
}

impl InboxRow {
    fn into_core(self) -> Result<InboxItem> {
        let kind = NotificationKind::parse(&self.kind).ok_or_else(|| {
            StoreError::Database(format!("unknown notification kind: {}", self.kind))
        })?;
        Ok(InboxItem {
            notification: Notification {
                id: NotificationId::from_uuid(self.id),
                staff_id: self.staff_id.map(StaffId::from_uuid),
                title: self.title,
                message: self.message,
                kind,
                created_at: self.created_at,
            },
            read: self.is_read,
        })
    }
}

/// Parse a value that was validated before it was stored.
fn parse_stored<T: std::str::FromStr>(stored: &str) -> Result<T> {
    stored
        .parse()
        .map_err(|_| StoreError::Database(format!("corrupt stored value: {stored}")))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

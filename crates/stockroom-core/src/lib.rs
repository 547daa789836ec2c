//! Core types and utilities for the stockroom inventory ledger.
//!
//! This crate provides the foundational types used throughout the stockroom
//! platform:
//!
//! - **Identifiers**: `StaffId`, `ItemCode`, `BorrowId`, `AuditId`,
//!   `NotificationId`
//! - **Catalog & ledger**: `Item`, `StockBalance`
//! - **Audit trail**: `AuditEntry`, `StockAction`, `BalanceDelta`
//! - **Loans**: `BorrowTransaction`, `BorrowStatus`
//! - **Notifications**: `Notification`, `InboxItem`
//! - **Time**: `CivilClock`, strict due-date parsing, the reminder
//!   fire-time schedule
//!
//! # Quantity model
//!
//! Quantities are plain `i64` unit counts. The available `balance` of an
//! item is denormalized on its [`StockBalance`] row and is the single value
//! consulted before a withdrawal or borrow; it never goes below zero.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod audit;
pub mod borrow;
pub mod civil;
pub mod error;
pub mod ids;
pub mod item;
pub mod notify;
pub mod reminder;

pub use audit::{AuditEntry, BalanceDelta, StockAction, BALANCE_TABLE};
pub use borrow::{BorrowStatus, BorrowTransaction};
pub use civil::{parse_due_date, CivilClock, DEFAULT_CIVIL_OFFSET_HOURS};
pub use error::{LedgerError, Result};
pub use ids::{AuditId, BorrowId, IdError, ItemCode, NotificationId, StaffId, BORROW_ID_LEN};
pub use item::{Item, StockBalance};
pub use notify::{InboxItem, Notification, NotificationKind};
pub use reminder::reminder_fire_time;

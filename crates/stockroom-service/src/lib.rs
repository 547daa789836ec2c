//! Stockroom HTTP API Service.
//!
//! This crate provides the HTTP API for the stockroom inventory ledger,
//! including:
//!
//! - Stock movements (receive/withdraw, batchable)
//! - The borrow/return lifecycle with due-date reminder scheduling
//! - The append-only audit trail (read side)
//! - Notification retrieval and read-marking
//! - The minimal catalog seam the ledger needs (register/lookup/delete)
//!
//! # Identity
//!
//! Authentication happens upstream; the gateway forwards the acting staff
//! member's identity as `x-staff-*` headers, optionally proving itself with
//! a shared API key.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers need async for routing consistency

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod notify;
pub mod routes;
pub mod scheduler;
pub mod state;

pub use config::ServiceConfig;
pub use engine::{BorrowEngine, BorrowRequest};
pub use error::ApiError;
pub use notify::{EmailSender, LogEmailSender, NotificationDispatcher, StoreDispatcher};
pub use routes::create_router;
pub use scheduler::{
    deliver, JobHandle, PgJobScheduler, RecordingScheduler, ReminderPayload, ReminderScheduler,
};
pub use state::AppState;

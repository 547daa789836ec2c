//! Stockroom Client SDK.
//!
//! This crate provides a client library for services and tooling that talk
//! to the stockroom inventory ledger API.
//!
//! # Example
//!
//! ```no_run
//! use stockroom_client::{BorrowItemRequest, StaffContext, StockroomClient};
//!
//! # async fn example() -> Result<(), stockroom_client::ClientError> {
//! let client = StockroomClient::new(
//!     "http://stockroom.inventory.svc:8080",
//!     "gateway-api-key",
//!     StaffContext {
//!         staff_id: "7b0e9f6a-54b3-4b6e-a1e0-2f4dd7cf60a5".into(),
//!         name: "Alex Recorder".into(),
//!         email: Some("alex@example.org".into()),
//!     },
//! );
//!
//! // Check out two drills, due back at year's end
//! let loan = client.borrow_item(BorrowItemRequest {
//!     item_code: "IT-001".into(),
//!     quantity: 2,
//!     due_date: Some("31/12/2026".into()),
//!     job_ref: None,
//!     note: None,
//! }).await?;
//!
//! println!("Borrow token: {}", loan.id);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, StaffContext, StockroomClient};
pub use error::ClientError;
pub use types::*;

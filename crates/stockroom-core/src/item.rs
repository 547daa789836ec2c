//! Item and stock-balance types.
//!
//! An [`Item`] is the catalog identity anchor; a [`StockBalance`] is its 1:1
//! quantity ledger row. All quantity arithmetic funnels through
//! [`StockBalance::apply`], which is the single place the non-negativity
//! invariant is enforced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::StockAction;
use crate::error::LedgerError;
use crate::ids::ItemCode;

/// A catalog item.
///
/// Items are created by catalog management and referenced, never mutated,
/// by the ledger. The `code` is the immutable business key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique, immutable business key.
    pub code: ItemCode,

    /// Display name.
    pub name: String,

    /// Category label.
    pub category: String,

    /// Unit of measure (e.g. "pcs", "box").
    pub unit: String,

    /// When the item was created.
    pub created_at: DateTime<Utc>,

    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Create a new catalog item.
    #[must_use]
    pub fn new(code: ItemCode, name: String, category: String, unit: String) -> Self {
        let now = Utc::now();
        Self {
            code,
            name,
            category,
            unit,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The quantity ledger row for one item.
///
/// `balance` is denormalized for fast reads and is the single source of
/// truth consulted before any withdrawal or borrow. Leg accounting:
///
/// - RECEIVE adds to `total_quantity`, `received_qty` and `balance`
/// - WITHDRAW / BORROW adds to `withdrawn_qty` and subtracts from `balance`
/// - RETURN subtracts from `withdrawn_qty` and adds to `balance`
///
/// Invariant: `balance >= 0` at all times. Mutated exclusively through
/// [`StockBalance::apply`] inside the same store transaction as the audit
/// entry documenting the change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockBalance {
    /// The item this row belongs to (unique).
    pub item_code: ItemCode,

    /// Cumulative quantity ever received.
    pub total_quantity: i64,

    /// Running receive counter.
    pub received_qty: i64,

    /// Cumulative quantity withdrawn or currently out on loan.
    pub withdrawn_qty: i64,

    /// Current available quantity.
    pub balance: i64,

    /// When the row was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl StockBalance {
    /// Create a zeroed balance row for a freshly registered item.
    #[must_use]
    pub fn new(item_code: ItemCode) -> Self {
        Self {
            item_code,
            total_quantity: 0,
            received_qty: 0,
            withdrawn_qty: 0,
            balance: 0,
            updated_at: Utc::now(),
        }
    }

    /// Check whether `quantity` units are available for withdrawal/borrow.
    #[must_use]
    pub fn has_available(&self, quantity: i64) -> bool {
        self.balance >= quantity
    }

    /// Apply a stock movement, returning `(old_balance, new_balance)`.
    ///
    /// This is the balance mutator: every mutation path in every storage
    /// backend funnels through here, so the non-negativity guard lives in
    /// exactly one place.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidQuantity`] if `quantity <= 0`, and
    /// [`LedgerError::InsufficientStock`] if a debit would drive the
    /// balance below zero (the row is left untouched).
    pub fn apply(&mut self, action: StockAction, quantity: i64) -> Result<(i64, i64), LedgerError> {
        if quantity <= 0 {
            return Err(LedgerError::InvalidQuantity { quantity });
        }

        let old_balance = self.balance;
        let delta = action.signed_delta(quantity);

        if delta < 0 && !self.has_available(quantity) {
            return Err(LedgerError::InsufficientStock {
                item_code: self.item_code.to_string(),
                balance: self.balance,
                requested: quantity,
            });
        }

        match action {
            StockAction::Receive => {
                self.total_quantity += quantity;
                self.received_qty += quantity;
            }
            StockAction::Withdraw | StockAction::Borrow => {
                self.withdrawn_qty += quantity;
            }
            StockAction::Return => {
                self.withdrawn_qty -= quantity;
            }
        }
        self.balance += delta;
        self.updated_at = Utc::now();

        Ok((old_balance, self.balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn balance_with(initial: i64) -> StockBalance {
        let mut balance = StockBalance::new(ItemCode::from_str("IT-001").unwrap());
        if initial > 0 {
            balance.apply(StockAction::Receive, initial).unwrap();
        }
        balance
    }

    #[test]
    fn receive_grows_all_legs() {
        let mut balance = balance_with(0);
        let (old, new) = balance.apply(StockAction::Receive, 10).unwrap();
        assert_eq!((old, new), (0, 10));
        assert_eq!(balance.total_quantity, 10);
        assert_eq!(balance.received_qty, 10);
        assert_eq!(balance.withdrawn_qty, 0);
    }

    #[test]
    fn withdraw_within_balance() {
        let mut balance = balance_with(10);
        let (old, new) = balance.apply(StockAction::Withdraw, 3).unwrap();
        assert_eq!((old, new), (10, 7));
        assert_eq!(balance.withdrawn_qty, 3);
        assert_eq!(balance.total_quantity, 10);
    }

    #[test]
    fn withdraw_beyond_balance_is_rejected_unchanged() {
        let mut balance = balance_with(10);
        let err = balance.apply(StockAction::Withdraw, 15).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientStock {
                balance: 10,
                requested: 15,
                ..
            }
        ));
        assert_eq!(balance.balance, 10);
        assert_eq!(balance.withdrawn_qty, 0);
    }

    #[test]
    fn borrow_then_return_restores_balance() {
        let mut balance = balance_with(10);
        balance.apply(StockAction::Borrow, 4).unwrap();
        assert_eq!(balance.balance, 6);
        assert_eq!(balance.withdrawn_qty, 4);

        let (old, new) = balance.apply(StockAction::Return, 4).unwrap();
        assert_eq!((old, new), (6, 10));
        assert_eq!(balance.withdrawn_qty, 0);
    }

    #[test]
    fn exact_balance_withdrawal_allowed() {
        let mut balance = balance_with(5);
        let (_, new) = balance.apply(StockAction::Withdraw, 5).unwrap();
        assert_eq!(new, 0);
    }

    #[test]
    fn zero_and_negative_quantities_rejected() {
        let mut balance = balance_with(5);
        assert!(matches!(
            balance.apply(StockAction::Receive, 0),
            Err(LedgerError::InvalidQuantity { quantity: 0 })
        ));
        assert!(matches!(
            balance.apply(StockAction::Withdraw, -2),
            Err(LedgerError::InvalidQuantity { quantity: -2 })
        ));
        assert_eq!(balance.balance, 5);
    }
}

//! Audit-trail types.
//!
//! Every balance mutation appends exactly one [`AuditEntry`] in the same
//! store transaction. Entries are never updated or deleted. The `new_value`
//! column packs the resulting balance together with the signed receive and
//! withdraw legs so log viewers can reconstruct the per-leg deltas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::ids::{AuditId, ItemCode};

/// Table name recorded on balance-mutation audit entries.
pub const BALANCE_TABLE: &str = "stock_balances";

/// The kind of stock movement being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockAction {
    /// Stock received into the ledger.
    Receive,

    /// Stock permanently withdrawn.
    Withdraw,

    /// Stock checked out on loan.
    Borrow,

    /// Loaned stock checked back in.
    Return,
}

impl StockAction {
    /// Get the action name as recorded in the audit log.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Receive => "RECEIVE",
            Self::Withdraw => "WITHDRAW",
            Self::Borrow => "BORROW",
            Self::Return => "RETURN",
        }
    }

    /// Parse an audit-log action name.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] if the name is unknown.
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        match s {
            "RECEIVE" => Ok(Self::Receive),
            "WITHDRAW" => Ok(Self::Withdraw),
            "BORROW" => Ok(Self::Borrow),
            "RETURN" => Ok(Self::Return),
            other => Err(LedgerError::Storage(format!("unknown audit action: {other}"))),
        }
    }

    /// The signed balance delta this action produces for `quantity` units.
    #[must_use]
    pub const fn signed_delta(&self, quantity: i64) -> i64 {
        match self {
            Self::Receive | Self::Return => quantity,
            Self::Withdraw | Self::Borrow => -quantity,
        }
    }
}

/// The three figures packed into an audit entry's `new_value`.
///
/// The receive leg carries deltas from RECEIVE; the withdraw leg carries the
/// signed delta for WITHDRAW/BORROW (negative) and RETURN (positive, since a
/// return reverses a withdrawal). The unused leg is packed as `+0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceDelta {
    /// Balance after the mutation.
    pub new_balance: i64,

    /// Signed receive-leg delta.
    pub receive_leg: i64,

    /// Signed withdraw-leg delta.
    pub withdraw_leg: i64,
}

impl BalanceDelta {
    /// Build the delta record for one action of `quantity` units.
    #[must_use]
    pub const fn for_action(action: StockAction, quantity: i64, new_balance: i64) -> Self {
        let (receive_leg, withdraw_leg) = match action {
            StockAction::Receive => (quantity, 0),
            StockAction::Withdraw | StockAction::Borrow => (0, -quantity),
            StockAction::Return => (0, quantity),
        };
        Self {
            new_balance,
            receive_leg,
            withdraw_leg,
        }
    }

    /// Pack into the pipe-delimited `new_value` string, e.g. `7|+0|-3`.
    #[must_use]
    pub fn pack(&self) -> String {
        format!(
            "{}|{:+}|{:+}",
            self.new_balance, self.receive_leg, self.withdraw_leg
        )
    }

    /// Parse a packed `new_value` string back into its three figures.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] if the string is not three
    /// pipe-delimited signed integers.
    pub fn parse(packed: &str) -> Result<Self, LedgerError> {
        let mut parts = packed.split('|');
        let (Some(balance), Some(receive), Some(withdraw), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(LedgerError::Storage(format!(
                "malformed packed balance value: {packed}"
            )));
        };

        let parse_leg = |s: &str| {
            s.parse::<i64>()
                .map_err(|_| LedgerError::Storage(format!("malformed packed balance value: {packed}")))
        };

        Ok(Self {
            new_balance: parse_leg(balance)?,
            receive_leg: parse_leg(receive)?,
            withdraw_leg: parse_leg(withdraw)?,
        })
    }

    /// The single signed delta this record represents.
    #[must_use]
    pub const fn signed_delta(&self) -> i64 {
        self.receive_leg + self.withdraw_leg
    }
}

/// One append-only audit entry documenting a balance mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry ID (ULID for time-ordering).
    pub id: AuditId,

    /// The stock movement being recorded.
    pub action: StockAction,

    /// The mutated table.
    pub table_name: String,

    /// The mutated record's key (item code).
    pub record_id: String,

    /// Balance before the mutation, as a string.
    pub old_value: String,

    /// Packed balance + per-leg deltas after the mutation.
    pub new_value: String,

    /// Name of the staff member who recorded the mutation.
    pub actor: String,

    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Create the entry documenting one balance mutation.
    #[must_use]
    pub fn balance_mutation(
        action: StockAction,
        item_code: &ItemCode,
        old_balance: i64,
        delta: BalanceDelta,
        actor: String,
    ) -> Self {
        Self {
            id: AuditId::generate(),
            action,
            table_name: BALANCE_TABLE.to_string(),
            record_id: item_code.to_string(),
            old_value: old_balance.to_string(),
            new_value: delta.pack(),
            actor,
            created_at: Utc::now(),
        }
    }
}

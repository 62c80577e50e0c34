//! Core domain types for the point ledger.

use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use thiserror::Error;

use crate::Points;

/// User identifier.
pub type UserId = u64;

/// History record identifier.
pub type TxId = u64;

/// The kind of a balance-changing transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// Increase the balance.
    Charge,
    /// Decrease the balance.
    Use,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Charge => "charge",
            TransactionKind::Use => "use",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names neither `charge` nor `use`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transaction kind '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for TransactionKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("charge") {
            Ok(TransactionKind::Charge)
        } else if s.eq_ignore_ascii_case("use") {
            Ok(TransactionKind::Use)
        } else {
            Err(UnknownKind(s.to_string()))
        }
    }
}

/// Current balance of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub user: UserId,
    pub amount: Points,
    pub updated_at: SystemTime,
}

impl Balance {
    /// The implicit balance of a user that has never transacted. Stamped with the
    /// epoch, so repeated reads compare equal.
    pub fn empty(user: UserId) -> Self {
        Self {
            user,
            amount: Points::ZERO,
            updated_at: SystemTime::UNIX_EPOCH,
        }
    }
}

/// One committed transaction. Never mutated after it is appended to history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub id: TxId,
    pub user: UserId,
    /// The requested amount, not the resulting balance.
    pub amount: Points,
    pub kind: TransactionKind,
    pub timestamp: SystemTime,
}

/// An unvalidated transaction request, as it arrives from an outer layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub user: UserId,
    pub amount: i64,
    pub kind: String,
}

impl TransactionRequest {
    pub fn new(user: UserId, amount: i64, kind: impl Into<String>) -> Self {
        Self {
            user,
            amount,
            kind: kind.into(),
        }
    }

    pub fn charge(user: UserId, amount: i64) -> Self {
        Self::new(user, amount, TransactionKind::Charge.as_str())
    }

    pub fn use_points(user: UserId, amount: i64) -> Self {
        Self::new(user, amount, TransactionKind::Use.as_str())
    }
}

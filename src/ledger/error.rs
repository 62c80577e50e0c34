//! Error types for transaction processing.

use thiserror::Error;

use crate::Points;
use crate::model::{UnknownKind, UserId};
use crate::store::StoreError;

/// Error returned by [`Ledger::apply`](super::Ledger::apply).
///
/// Every variant except [`Store`](LedgerError::Store) is a rejection: it is raised
/// before any mutation and leaves balance and history untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("amount must be a positive integer, got {0}")]
    InvalidAmount(i64),

    #[error("invalid transaction type '{0}'")]
    InvalidTransactionType(String),

    #[error("charge would exceed limit for user {user}: current {current}, requested {requested}, max {max}")]
    LimitExceeded {
        user: UserId,
        current: Points,
        requested: Points,
        max: Points,
    },

    #[error("insufficient balance for user {user}: current {current}, requested {requested}")]
    InsufficientBalance {
        user: UserId,
        current: Points,
        requested: Points,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Whether this error is a side-effect-free validation rejection, as opposed to a
    /// store failure with unknown outcome.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, LedgerError::Store(_))
    }
}

impl From<UnknownKind> for LedgerError {
    fn from(err: UnknownKind) -> Self {
        LedgerError::InvalidTransactionType(err.0)
    }
}

//! Storage contracts for the ledger. Provides:
//! - Current balance per user ([`BalanceStore`])
//! - Append-only transaction history per user ([`HistoryStore`])
//!
//! Both stores are shared between concurrent callers, so every method takes
//! `&self`. The in-memory implementations guard their maps with std locks.

use std::time::SystemTime;

use thiserror::Error;

use crate::Points;
use crate::model::{Balance, TransactionKind, TransactionRecord, UserId};

mod balance;
mod history;

pub use balance::InMemoryBalanceStore;
pub use history::InMemoryHistoryStore;

/// Failure of an underlying store. When returned from a write, the outcome of the
/// surrounding transaction is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0} lock poisoned")]
    Poisoned(&'static str),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub trait BalanceStore: Send + Sync {
    /// Read the balance of `user`. Users without a stored balance read as zero.
    fn select_by_id(&self, user: UserId) -> Result<Balance, StoreError>;

    /// Overwrite the balance of `user`, returning the stored value with a fresh
    /// `updated_at`.
    fn insert_or_update(&self, user: UserId, amount: Points) -> Result<Balance, StoreError>;

    /// All stored balances, ordered by user id.
    fn select_all(&self) -> Result<Vec<Balance>, StoreError>;
}

pub trait HistoryStore: Send + Sync {
    /// Append a record for `user` and return it with its assigned id.
    fn insert(
        &self,
        user: UserId,
        amount: Points,
        kind: TransactionKind,
        timestamp: SystemTime,
    ) -> Result<TransactionRecord, StoreError>;

    /// Every record of `user`, in insertion order.
    fn select_all_by_user_id(&self, user: UserId) -> Result<Vec<TransactionRecord>, StoreError>;
}

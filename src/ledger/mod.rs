//! Transaction coordinator.
//!
//! The ledger validates point transactions against the current balance, applies
//! them, and records them in history. Every `apply` runs its read, check, write and
//! append steps inside a critical section, so concurrent callers never act on a
//! stale balance. Reads go straight to the stores.
//! Also supports async stream of transaction requests.

use std::time::SystemTime;

use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::Points;
use crate::config::{LedgerConfig, LockGranularity};
use crate::model::{Balance, TransactionKind, TransactionRecord, TransactionRequest, UserId};
use crate::store::{
    BalanceStore, HistoryStore, InMemoryBalanceStore, InMemoryHistoryStore, StoreError,
};

mod error;
pub use error::LedgerError;

mod section;
use section::CriticalSection;

/// Outcome counts of [`Ledger::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub applied: usize,
    pub rejected: usize,
    /// Requests that hit a store failure; their outcome is unknown.
    pub failed: usize,
}

/// The point ledger.
///
/// Holds the two stores, the balance limit and the critical section guarding
/// `apply`. Share it between threads behind an `Arc`.
#[derive(Debug)]
pub struct Ledger<B = InMemoryBalanceStore, H = InMemoryHistoryStore> {
    balances: B,
    history: H,
    max_balance: Points,
    section: CriticalSection,
}

impl Ledger {
    /// An in-memory ledger with the default configuration.
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// An in-memory ledger with the given configuration.
    pub fn with_config(config: LedgerConfig) -> Self {
        Self::with_stores(
            config,
            InMemoryBalanceStore::new(),
            InMemoryHistoryStore::new(),
        )
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

/// Public API
impl<B: BalanceStore, H: HistoryStore> Ledger<B, H> {
    pub fn with_stores(config: LedgerConfig, balances: B, history: H) -> Self {
        Self {
            balances,
            history,
            max_balance: config.max_balance,
            section: CriticalSection::new(config.granularity),
        }
    }

    pub fn max_balance(&self) -> Points {
        self.max_balance
    }

    pub fn granularity(&self) -> LockGranularity {
        self.section.granularity()
    }

    /// Current balance of `user`; zero if the user never transacted.
    pub fn balance(&self, user: UserId) -> Result<Balance, StoreError> {
        self.balances.select_by_id(user)
    }

    /// Committed transactions of `user`, oldest first.
    pub fn history(&self, user: UserId) -> Result<Vec<TransactionRecord>, StoreError> {
        self.history.select_all_by_user_id(user)
    }

    /// Every stored balance, ordered by user id.
    pub fn balances(&self) -> Result<Vec<Balance>, StoreError> {
        self.balances.select_all()
    }

    /// Apply a single transaction and return the updated balance.
    ///
    /// Rejections leave balance and history untouched. A [`LedgerError::Store`]
    /// means the outcome is unknown and should be confirmed by re-reading.
    pub fn apply(
        &self,
        user: UserId,
        amount: i64,
        kind: TransactionKind,
    ) -> Result<Balance, LedgerError> {
        let result =
            Self::requested_points(amount).and_then(|points| self.commit(user, points, kind));
        Self::log_result(user, kind.as_str(), amount, &result);
        result
    }

    /// Validate a raw request and apply it.
    pub fn submit(&self, request: &TransactionRequest) -> Result<Balance, LedgerError> {
        let result = Self::requested_points(request.amount).and_then(|points| {
            let kind = request.kind.parse::<TransactionKind>()?;
            self.commit(request.user, points, kind)
        });
        Self::log_result(request.user, &request.kind, request.amount, &result);
        result
    }

    /// Run the ledger over the given request stream. Failed requests do not stop it.
    pub async fn run(
        &self,
        mut stream: impl Stream<Item = TransactionRequest> + Unpin,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        while let Some(request) = stream.next().await {
            match self.submit(&request) {
                Ok(_) => summary.applied += 1,
                Err(e) if e.is_rejection() => summary.rejected += 1,
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }
}

/// Private API
impl<B: BalanceStore, H: HistoryStore> Ledger<B, H> {
    fn log_result(
        user: UserId,
        kind: &str,
        amount: i64,
        result: &Result<Balance, LedgerError>,
    ) {
        match result {
            Ok(balance) => {
                info!(user, kind, amount, balance = %balance.amount, "{kind} applied");
            }
            Err(LedgerError::Store(e)) => {
                warn!(user, kind, amount, error = %e, "{kind} outcome unknown, store failed");
            }
            Err(e) => {
                info!(user, kind, amount, reason = %e, "{kind} rejected");
            }
        }
    }

    fn requested_points(amount: i64) -> Result<Points, LedgerError> {
        Points::from_requested(amount).ok_or(LedgerError::InvalidAmount(amount))
    }

    /// Read, validate, write and append as one unit with respect to other commits
    /// covering the same user.
    fn commit(
        &self,
        user: UserId,
        amount: Points,
        kind: TransactionKind,
    ) -> Result<Balance, LedgerError> {
        self.section.enter(user, || -> Result<Balance, LedgerError> {
            let current = self.balances.select_by_id(user)?.amount;
            let next = self.next_balance(user, current, amount, kind)?;

            let balance = self.balances.insert_or_update(user, next)?;
            self.history.insert(user, amount, kind, SystemTime::now())?;
            Ok(balance)
        })
    }

    /// Compute the post-transaction balance, or the reason it is not allowed:
    /// - Charge must stay within `max_balance`
    /// - Use must not go below zero
    fn next_balance(
        &self,
        user: UserId,
        current: Points,
        amount: Points,
        kind: TransactionKind,
    ) -> Result<Points, LedgerError> {
        match kind {
            TransactionKind::Charge => current
                .checked_add(amount)
                .filter(|next| *next <= self.max_balance)
                .ok_or(LedgerError::LimitExceeded {
                    user,
                    current,
                    requested: amount,
                    max: self.max_balance,
                }),
            TransactionKind::Use => {
                current
                    .checked_sub(amount)
                    .ok_or(LedgerError::InsufficientBalance {
                        user,
                        current,
                        requested: amount,
                    })
            }
        }
    }
}

pub mod config;
pub mod csv;
pub mod ledger;
pub mod model;
pub mod points;
pub mod store;

pub use config::{LedgerConfig, LockGranularity};
pub use ledger::{Ledger, LedgerError, RunSummary};
pub use model::{Balance, TransactionKind, TransactionRecord, TransactionRequest, TxId, UserId};
pub use points::Points;
pub use store::{BalanceStore, HistoryStore, StoreError};

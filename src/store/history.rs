use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use super::{HistoryStore, StoreError};
use crate::Points;
use crate::model::{TransactionKind, TransactionRecord, TxId, UserId};

/// Per-user append-only logs. Record ids come from one counter shared by all users
/// and are drawn while the log lock is held, so ids follow append order.
#[derive(Debug)]
pub struct InMemoryHistoryStore {
    records: Mutex<HashMap<UserId, Vec<TransactionRecord>>>,
    next_id: AtomicU64,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> TxId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn insert(
        &self,
        user: UserId,
        amount: Points,
        kind: TransactionKind,
        timestamp: SystemTime,
    ) -> Result<TransactionRecord, StoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError::Poisoned("history"))?;
        let record = TransactionRecord {
            id: self.next_id(),
            user,
            amount,
            kind,
            timestamp,
        };
        records.entry(user).or_default().push(record.clone());
        Ok(record)
    }

    fn select_all_by_user_id(&self, user: UserId) -> Result<Vec<TransactionRecord>, StoreError> {
        let records = self
            .records
            .lock()
            .map_err(|_| StoreError::Poisoned("history"))?;
        Ok(records.get(&user).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn append(
        store: &InMemoryHistoryStore,
        user: UserId,
        amount: u64,
        kind: TransactionKind,
    ) -> TransactionRecord {
        store
            .insert(user, Points::new(amount), kind, SystemTime::now())
            .unwrap()
    }

    #[test]
    fn unknown_user_has_empty_history() {
        let store = InMemoryHistoryStore::new();
        assert!(store.select_all_by_user_id(1).unwrap().is_empty());
    }

    #[test]
    fn records_keep_insertion_order() {
        let store = InMemoryHistoryStore::new();
        append(&store, 1, 50, TransactionKind::Charge);
        append(&store, 1, 30, TransactionKind::Use);
        append(&store, 1, 10, TransactionKind::Charge);

        let history = store.select_all_by_user_id(1).unwrap();
        let amounts: Vec<_> = history.iter().map(|r| r.amount.get()).collect();
        assert_eq!(amounts, vec![50, 30, 10]);
        assert_eq!(history[1].kind, TransactionKind::Use);
    }

    #[test]
    fn ids_are_shared_across_users() {
        let store = InMemoryHistoryStore::new();
        let a = append(&store, 1, 10, TransactionKind::Charge);
        let b = append(&store, 2, 10, TransactionKind::Charge);
        let c = append(&store, 1, 5, TransactionKind::Use);

        assert_eq!((a.id, b.id, c.id), (1, 2, 3));
        assert_eq!(store.select_all_by_user_id(2).unwrap(), vec![b]);
    }

    #[test]
    fn users_are_isolated() {
        let store = InMemoryHistoryStore::new();
        append(&store, 1, 10, TransactionKind::Charge);
        append(&store, 2, 20, TransactionKind::Charge);

        let history = store.select_all_by_user_id(1).unwrap();
        assert_eq!(history.len(), 1);
        assert!(history.iter().all(|r| r.user == 1));
    }
}

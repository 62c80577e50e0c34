use std::collections::HashMap;
use std::sync::RwLock;
use std::time::SystemTime;

use super::{BalanceStore, StoreError};
use crate::Points;
use crate::model::{Balance, UserId};

/// Balances kept in a `HashMap` behind a `RwLock`. Reads of unknown users yield a
/// zero balance without inserting it.
#[derive(Debug, Default)]
pub struct InMemoryBalanceStore {
    balances: RwLock<HashMap<UserId, Balance>>,
}

impl InMemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with preset balances.
    pub fn with_balances(balances: impl IntoIterator<Item = (UserId, Points)>) -> Self {
        let now = SystemTime::now();
        let balances = balances
            .into_iter()
            .map(|(user, amount)| {
                (
                    user,
                    Balance {
                        user,
                        amount,
                        updated_at: now,
                    },
                )
            })
            .collect();
        Self {
            balances: RwLock::new(balances),
        }
    }
}

impl BalanceStore for InMemoryBalanceStore {
    fn select_by_id(&self, user: UserId) -> Result<Balance, StoreError> {
        let balances = self
            .balances
            .read()
            .map_err(|_| StoreError::Poisoned("balance"))?;
        Ok(balances
            .get(&user)
            .cloned()
            .unwrap_or_else(|| Balance::empty(user)))
    }

    fn insert_or_update(&self, user: UserId, amount: Points) -> Result<Balance, StoreError> {
        let balance = Balance {
            user,
            amount,
            updated_at: SystemTime::now(),
        };
        self.balances
            .write()
            .map_err(|_| StoreError::Poisoned("balance"))?
            .insert(user, balance.clone());
        Ok(balance)
    }

    fn select_all(&self) -> Result<Vec<Balance>, StoreError> {
        let balances = self
            .balances
            .read()
            .map_err(|_| StoreError::Poisoned("balance"))?;
        let mut all: Vec<_> = balances.values().cloned().collect();
        all.sort_by_key(|b| b.user);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_user_reads_as_zero() {
        let store = InMemoryBalanceStore::new();
        let balance = store.select_by_id(42).unwrap();
        assert_eq!(balance.user, 42);
        assert_eq!(balance.amount, Points::ZERO);

        // reading does not create an entry
        assert!(store.select_all().unwrap().is_empty());
    }

    #[test]
    fn insert_or_update_overwrites() {
        let store = InMemoryBalanceStore::new();
        store.insert_or_update(1, Points::new(100)).unwrap();
        let updated = store.insert_or_update(1, Points::new(70)).unwrap();

        assert_eq!(updated.amount, Points::new(70));
        assert_eq!(store.select_by_id(1).unwrap().amount, Points::new(70));
    }

    #[test]
    fn insert_or_update_refreshes_timestamp() {
        let store = InMemoryBalanceStore::new();
        let first = store.insert_or_update(1, Points::new(100)).unwrap();
        let second = store.insert_or_update(1, Points::new(100)).unwrap();
        assert!(second.updated_at >= first.updated_at);
    }

    #[test]
    fn select_all_is_ordered_by_user() {
        let store = InMemoryBalanceStore::with_balances([
            (3, Points::new(30)),
            (1, Points::new(10)),
            (2, Points::new(20)),
        ]);
        let users: Vec<_> = store.select_all().unwrap().iter().map(|b| b.user).collect();
        assert_eq!(users, vec![1, 2, 3]);
    }
}

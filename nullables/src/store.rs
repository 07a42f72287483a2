//! Nullable store: thread-safe in-memory storage for testing.

use coffer_store::{Account, AccountStore, MetaStore, ReserveStore, Store, StoreBatch, StoreError};
use coffer_types::{Amount, HolderAddress};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// An in-memory storage backend for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullStore {
    accounts: Mutex<HashMap<HolderAddress, Account>>,
    meta: Mutex<HashMap<String, Vec<u8>>>,
    reserves: Mutex<HashMap<HolderAddress, Amount>>,
    fail_next_commit: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            meta: Mutex::new(HashMap::new()),
            reserves: Mutex::new(HashMap::new()),
            fail_next_commit: AtomicBool::new(false),
        }
    }

    /// Make the next batch commit fail with a backend error. The failed
    /// batch's puts are discarded, exactly like a real aborted transaction.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for NullStore {
    fn get_account(&self, address: &HolderAddress) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.lock().unwrap().get(address).copied())
    }

    fn put_account(&self, address: &HolderAddress, account: &Account) -> Result<(), StoreError> {
        self.accounts
            .lock()
            .unwrap()
            .insert(address.clone(), *account);
        Ok(())
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        Ok(self.accounts.lock().unwrap().len() as u64)
    }

    fn iter_accounts(&self) -> Result<Vec<(HolderAddress, Account)>, StoreError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .map(|(addr, acct)| (addr.clone(), *acct))
            .collect())
    }
}

impl MetaStore for NullStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.meta
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.meta
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn delete_meta(&self, key: &str) -> Result<(), StoreError> {
        self.meta.lock().unwrap().remove(key);
        Ok(())
    }
}

impl ReserveStore for NullStore {
    fn get_reserve(&self, address: &HolderAddress) -> Result<Option<Amount>, StoreError> {
        Ok(self.reserves.lock().unwrap().get(address).copied())
    }

    fn put_reserve(&self, address: &HolderAddress, amount: Amount) -> Result<(), StoreError> {
        self.reserves.lock().unwrap().insert(address.clone(), amount);
        Ok(())
    }

    fn iter_reserves(&self) -> Result<Vec<(HolderAddress, Amount)>, StoreError> {
        Ok(self
            .reserves
            .lock()
            .unwrap()
            .iter()
            .map(|(addr, amount)| (addr.clone(), *amount))
            .collect())
    }
}

impl Store for NullStore {
    fn begin_write(&self) -> Result<Box<dyn StoreBatch + '_>, StoreError> {
        Ok(Box::new(NullBatch {
            store: self,
            accounts: Vec::new(),
            meta: Vec::new(),
            reserves: Vec::new(),
        }))
    }
}

/// Buffers writes until `commit`; dropping the batch discards them.
struct NullBatch<'a> {
    store: &'a NullStore,
    accounts: Vec<(HolderAddress, Account)>,
    meta: Vec<(String, Vec<u8>)>,
    reserves: Vec<(HolderAddress, Amount)>,
}

impl StoreBatch for NullBatch<'_> {
    fn put_account(
        &mut self,
        address: &HolderAddress,
        account: &Account,
    ) -> Result<(), StoreError> {
        self.accounts.push((address.clone(), *account));
        Ok(())
    }

    fn put_meta(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.meta.push((key.to_string(), value.to_vec()));
        Ok(())
    }

    fn put_reserve(&mut self, address: &HolderAddress, amount: Amount) -> Result<(), StoreError> {
        self.reserves.push((address.clone(), amount));
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        if self.store.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("injected commit failure".into()));
        }
        let mut accounts = self.store.accounts.lock().unwrap();
        let mut meta = self.store.meta.lock().unwrap();
        let mut reserves = self.store.reserves.lock().unwrap();
        for (addr, acct) in self.accounts {
            accounts.insert(addr, acct);
        }
        for (key, value) in self.meta {
            meta.insert(key, value);
        }
        for (addr, amount) in self.reserves {
            reserves.insert(addr, amount);
        }
        Ok(())
    }
}

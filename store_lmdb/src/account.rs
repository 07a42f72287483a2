//! LMDB implementation of AccountStore.

use coffer_store::{Account, AccountStore, StoreError};
use coffer_types::HolderAddress;

use crate::environment::LmdbStore;
use crate::LmdbError;

impl AccountStore for LmdbStore {
    fn get_account(&self, address: &HolderAddress) -> Result<Option<Account>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let account = self
            .accounts_db
            .get(&rtxn, address.as_str())
            .map_err(LmdbError::from)?;
        Ok(account)
    }

    fn put_account(&self, address: &HolderAddress, account: &Account) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.accounts_db
            .put(&mut wtxn, address.as_str(), account)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.accounts_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }

    fn iter_accounts(&self) -> Result<Vec<(HolderAddress, Account)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut out = Vec::new();
        for entry in self.accounts_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (key, account) = entry.map_err(LmdbError::from)?;
            let address = HolderAddress::parse(key)
                .map_err(|e| StoreError::Corruption(format!("account key '{key}': {e}")))?;
            out.push((address, account));
        }
        Ok(out)
    }
}

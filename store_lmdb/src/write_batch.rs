//! Write batching: the puts of one logical ledger operation go into a
//! single LMDB write transaction, so the operation lands on disk atomically
//! and pays for one fsync.
//!
//! If the batch is dropped without [`StoreBatch::commit`], the underlying
//! LMDB transaction is aborted and nothing is written.

use heed::RwTxn;

use coffer_store::{Account, StoreBatch, StoreError};
use coffer_types::{Amount, HolderAddress};

use crate::environment::LmdbStore;
use crate::LmdbError;

pub struct LmdbBatch<'a> {
    txn: RwTxn<'a>,
    store: &'a LmdbStore,
}

impl<'a> LmdbBatch<'a> {
    pub(crate) fn new(store: &'a LmdbStore) -> Result<Self, StoreError> {
        let txn = store.env.write_txn().map_err(LmdbError::from)?;
        Ok(Self { txn, store })
    }
}

impl StoreBatch for LmdbBatch<'_> {
    fn put_account(
        &mut self,
        address: &HolderAddress,
        account: &Account,
    ) -> Result<(), StoreError> {
        self.store
            .accounts_db
            .put(&mut self.txn, address.as_str(), account)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn put_meta(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.store
            .meta_db
            .put(&mut self.txn, key, value)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn put_reserve(&mut self, address: &HolderAddress, amount: Amount) -> Result<(), StoreError> {
        self.store
            .reserves_db
            .put(&mut self.txn, address.as_str(), &amount)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.txn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

//! LMDB implementation of ReserveStore.

use coffer_store::{ReserveStore, StoreError};
use coffer_types::{Amount, HolderAddress};

use crate::environment::LmdbStore;
use crate::LmdbError;

impl ReserveStore for LmdbStore {
    fn get_reserve(&self, address: &HolderAddress) -> Result<Option<Amount>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let amount = self
            .reserves_db
            .get(&rtxn, address.as_str())
            .map_err(LmdbError::from)?;
        Ok(amount)
    }

    fn put_reserve(&self, address: &HolderAddress, amount: Amount) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.reserves_db
            .put(&mut wtxn, address.as_str(), &amount)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_reserves(&self) -> Result<Vec<(HolderAddress, Amount)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut out = Vec::new();
        for entry in self.reserves_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (key, amount) = entry.map_err(LmdbError::from)?;
            let address = HolderAddress::parse(key)
                .map_err(|e| StoreError::Corruption(format!("reserve key '{key}': {e}")))?;
            out.push((address, amount));
        }
        Ok(out)
    }
}

//! Account storage trait and the persisted account record.

use crate::StoreError;
use coffer_types::{Amount, HolderAddress, Rate, Timestamp};
use serde::{Deserialize, Serialize};

/// Per-holder state stored in the ledger.
///
/// `principal` is the materialized balance as of `last_accrual`; everything
/// earned since then exists only as a function of time and `locked_rate`
/// until the next ledger operation folds it in. Accounts are created
/// implicitly on first touch and never deleted; a fully burned holder keeps
/// a zero-principal record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub principal: Amount,
    pub locked_rate: Rate,
    pub last_accrual: Timestamp,
}

impl Account {
    /// A fresh account: nothing deposited, locked at `rate`, window starting at `now`.
    pub fn opened(rate: Rate, now: Timestamp) -> Self {
        Self {
            principal: Amount::ZERO,
            locked_rate: rate,
            last_accrual: now,
        }
    }
}

/// Trait for account storage operations.
pub trait AccountStore {
    /// Fetch one account. `None` means the holder has never been touched.
    fn get_account(&self, address: &HolderAddress) -> Result<Option<Account>, StoreError>;

    fn put_account(&self, address: &HolderAddress, account: &Account) -> Result<(), StoreError>;

    fn exists(&self, address: &HolderAddress) -> Result<bool, StoreError> {
        self.get_account(address).map(|a| a.is_some())
    }

    fn account_count(&self) -> Result<u64, StoreError>;

    fn iter_accounts(&self) -> Result<Vec<(HolderAddress, Account)>, StoreError>;
}

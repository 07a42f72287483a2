//! Reserve asset storage trait.
//!
//! The exchange front-end moves a reserve asset between holders and the
//! vault; those balances persist alongside the accounts they back.

use crate::StoreError;
use coffer_types::{Amount, HolderAddress};

/// Trait for reserve balance storage operations.
pub trait ReserveStore {
    /// Fetch one reserve balance. `None` means the holder never held reserve.
    fn get_reserve(&self, address: &HolderAddress) -> Result<Option<Amount>, StoreError>;

    fn put_reserve(&self, address: &HolderAddress, amount: Amount) -> Result<(), StoreError>;

    fn iter_reserves(&self) -> Result<Vec<(HolderAddress, Amount)>, StoreError>;
}

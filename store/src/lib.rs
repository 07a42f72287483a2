//! Abstract storage traits for the coffer ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod account;
pub mod error;
pub mod meta;
pub mod reserve;

pub use account::{Account, AccountStore};
pub use error::StoreError;
pub use meta::{MetaStore, GLOBAL_RATE_KEY, SCHEMA_VERSION, SCHEMA_VERSION_KEY};
pub use reserve::ReserveStore;

use coffer_types::{HolderAddress, Rate};

/// A complete storage backend.
///
/// One logical ledger operation touches accounts, metadata, and reserve
/// balances together; `begin_write` hands out a batch that commits all of it
/// atomically (or nothing, if the batch is dropped).
pub trait Store: AccountStore + MetaStore + ReserveStore + Send + Sync {
    fn begin_write(&self) -> Result<Box<dyn StoreBatch + '_>, StoreError>;
}

/// A pending atomic write. Dropping without `commit` discards every put.
pub trait StoreBatch {
    fn put_account(&mut self, address: &HolderAddress, account: &Account)
        -> Result<(), StoreError>;

    fn put_meta(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    fn put_reserve(
        &mut self,
        address: &HolderAddress,
        amount: coffer_types::Amount,
    ) -> Result<(), StoreError>;

    fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Store the global rate under its meta key.
    fn put_global_rate(&mut self, rate: Rate) -> Result<(), StoreError> {
        self.put_meta(GLOBAL_RATE_KEY, &rate.raw().to_le_bytes())
    }

    /// Stamp the schema version under its meta key.
    fn put_schema_version(&mut self, version: u32) -> Result<(), StoreError> {
        self.put_meta(SCHEMA_VERSION_KEY, &version.to_le_bytes())
    }
}

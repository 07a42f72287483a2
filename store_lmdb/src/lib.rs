//! LMDB storage backend for the coffer ledger.
//!
//! Implements the storage traits from `coffer-store` using the `heed` LMDB
//! bindings. Each logical store maps to one named database within a single
//! environment, so one write batch covers all of them in one transaction.

pub mod account;
pub mod environment;
pub mod error;
pub mod meta;
pub mod reserve;
pub mod write_batch;

pub use environment::LmdbStore;
pub use error::LmdbError;

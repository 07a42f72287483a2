//! LMDB environment setup.

use std::path::Path;

use heed::types::{Bytes, SerdeBincode, Str};
use heed::{Database, Env, EnvOpenOptions};

use coffer_store::{Account, Store, StoreBatch, StoreError};
use coffer_types::Amount;

use crate::write_batch::LmdbBatch;
use crate::LmdbError;

/// Default map size for production use (1 GiB).
pub const DEFAULT_MAP_SIZE: usize = 1024 * 1024 * 1024;

/// The LMDB-backed storage environment and all database handles.
pub struct LmdbStore {
    pub(crate) env: Env,
    pub(crate) accounts_db: Database<Str, SerdeBincode<Account>>,
    pub(crate) meta_db: Database<Str, Bytes>,
    pub(crate) reserves_db: Database<Str, SerdeBincode<Amount>>,
}

impl LmdbStore {
    /// Open or create an LMDB environment at the given path.
    ///
    /// The directory is created if it does not exist. `map_size` is the
    /// maximum size the database may grow to; LMDB maps it up front.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::Heed(format!("create {}: {e}", path.display())))?;
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(3)
                .open(path)?
        };
        let mut wtxn = env.write_txn()?;
        let accounts_db = env.create_database(&mut wtxn, Some("accounts"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        let reserves_db = env.create_database(&mut wtxn, Some("reserves"))?;
        wtxn.commit()?;
        Ok(Self {
            env,
            accounts_db,
            meta_db,
            reserves_db,
        })
    }
}

impl Store for LmdbStore {
    fn begin_write(&self) -> Result<Box<dyn StoreBatch + '_>, StoreError> {
        Ok(Box::new(LmdbBatch::new(self)?))
    }
}

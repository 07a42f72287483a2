//! Metadata storage trait.

use crate::StoreError;
use coffer_types::Rate;

/// Meta key holding the current global rate (u64 little-endian).
pub const GLOBAL_RATE_KEY: &str = "global_rate";

/// Meta key holding the schema version (u32 little-endian).
pub const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Current on-disk schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Trait for storing database metadata (schema version, global rate).
///
/// This is a generic key-value store for internal bookkeeping that doesn't
/// belong in any domain-specific store.
pub trait MetaStore {
    /// Store a metadata value.
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Retrieve a metadata value. Missing keys are `NotFound`.
    fn get_meta(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Delete a metadata entry.
    fn delete_meta(&self, key: &str) -> Result<(), StoreError>;

    /// Get the current database schema version.
    fn get_schema_version(&self) -> Result<u32, StoreError> {
        let bytes = self.get_meta(SCHEMA_VERSION_KEY)?;
        let arr: [u8; 4] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| StoreError::Corruption("schema version bytes malformed".into()))?;
        Ok(u32::from_le_bytes(arr))
    }

    /// Set the database schema version.
    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        self.put_meta(SCHEMA_VERSION_KEY, &version.to_le_bytes())
    }

    /// Read the stored global rate, `None` if the database was never initialized.
    fn get_global_rate(&self) -> Result<Option<Rate>, StoreError> {
        match self.get_meta(GLOBAL_RATE_KEY) {
            Ok(bytes) => {
                let arr: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| StoreError::Corruption("global rate bytes malformed".into()))?;
                Ok(Some(Rate::new(u64::from_le_bytes(arr))))
            }
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Store the global rate.
    fn set_global_rate(&self, rate: Rate) -> Result<(), StoreError> {
        self.put_meta(GLOBAL_RATE_KEY, &rate.raw().to_le_bytes())
    }
}

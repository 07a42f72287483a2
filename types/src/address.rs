//! Holder address type with `cfr_` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned when parsing an address from untrusted input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must start with {}", HolderAddress::PREFIX)]
    MissingPrefix,

    #[error("address has no body after the prefix")]
    Empty,
}

/// A coffer holder address, always prefixed with `cfr_`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HolderAddress(String);

impl HolderAddress {
    /// The standard prefix for all coffer holder addresses.
    pub const PREFIX: &'static str = "cfr_";

    /// Create a new holder address from a raw string.
    ///
    /// # Panics
    /// Panics if the string does not start with `cfr_`.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(s.starts_with(Self::PREFIX), "address must start with cfr_");
        Self(s)
    }

    /// Parse an address from untrusted input (RPC, config files).
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        if !raw.starts_with(Self::PREFIX) {
            return Err(AddressError::MissingPrefix);
        }
        if raw.len() == Self::PREFIX.len() {
            return Err(AddressError::Empty);
        }
        Ok(Self(raw.to_string()))
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this address is well-formed.
    pub fn is_valid(&self) -> bool {
        self.0.starts_with(Self::PREFIX) && self.0.len() > Self::PREFIX.len()
    }
}

impl fmt::Display for HolderAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for HolderAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

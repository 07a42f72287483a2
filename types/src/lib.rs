//! Fundamental types for the coffer ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! holder addresses, amounts, interest rates, and timestamps.

pub mod address;
pub mod amount;
pub mod rate;
pub mod time;

pub use address::{AddressError, HolderAddress};
pub use amount::{Amount, ParseAmountError};
pub use rate::{Rate, RATE_SCALE};
pub use time::{Clock, SystemClock, Timestamp};

//! Ledger-specific errors.

use coffer_types::{Amount, Rate};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    #[error("rate increase rejected: current {current}, requested {requested}")]
    RateChangeRejected { current: Rate, requested: Rate },

    #[error("arithmetic overflow in accrual computation")]
    Overflow,
}

//! Exchange-specific errors.

use coffer_ledger::LedgerError;
use coffer_types::Amount;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("deposit amount must be non-zero")]
    ZeroDeposit,

    #[error("insufficient reserve: need {needed}, available {available}")]
    InsufficientReserve { needed: Amount, available: Amount },

    #[error("vault cannot cover redemption: need {needed}, available {available}")]
    PayoutFailure { needed: Amount, available: Amount },

    #[error("the vault address cannot act as depositor, redeemer, or funder")]
    VaultOperation,

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("arithmetic overflow in reserve accounting")]
    Overflow,
}

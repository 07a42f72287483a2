use coffer_types::{Amount, HolderAddress};
use thiserror::Error;

use crate::gate::Capability;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("principal {principal} lacks the {capability} capability")]
    Unauthorized {
        principal: HolderAddress,
        capability: Capability,
    },

    #[error("allowance exceeded: spender {spender} may move {available} of {needed} requested")]
    AllowanceExceeded {
        spender: HolderAddress,
        needed: Amount,
        available: Amount,
    },

    #[error("ledger error: {0}")]
    Ledger(#[from] coffer_ledger::LedgerError),

    #[error("exchange error: {0}")]
    Exchange(#[from] coffer_exchange::ExchangeError),

    #[error("store error: {0}")]
    Store(#[from] coffer_store::StoreError),

    #[error("invalid address: {0}")]
    Address(#[from] coffer_types::AddressError),

    #[error("config error: {0}")]
    Config(String),
}

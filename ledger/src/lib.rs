//! The accrual ledger engine.
//!
//! A holder's observed balance is a function of time:
//! `balance(t) = principal + principal × locked_rate × (t − t_last) / RATE_SCALE`
//!
//! Interest is linear and never compounds on its own. Every state-changing
//! operation first materializes the interest earned so far (folds it into the
//! stored principal and restarts the accrual window), then applies its own
//! mutation. Reads never mutate; a pure view at time `t` always sees the
//! formula above.
//!
//! This crate handles:
//! - Balance computation from principal, locked rate, and elapsed time
//! - Materialization ordering for mint, burn, and transfer
//! - Rate-lock propagation (mint re-locks, transfers to empty holders inherit)
//! - The decrease-only global rate policy

pub mod accrual;
pub mod error;
pub mod ledger;

pub use error::LedgerError;
pub use ledger::{AccrualLedger, BurnOutcome, MintOutcome, RateChange, TransferOutcome};

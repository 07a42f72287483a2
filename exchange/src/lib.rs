//! The reserve exchange front-end.
//!
//! Holders deposit a reserve asset and receive ledger units 1:1; redeeming
//! burns units and pays the reserve asset back 1:1. Because units accrue
//! interest and the exchange only ever took the original deposits, redeeming
//! accrued interest depends on the vault being topped up out of band. A
//! redemption the vault cannot cover fails whole: no units are burned unless
//! the payout is certain to follow.

pub mod error;
pub mod exchange;
pub mod reserve;

pub use error::ExchangeError;
pub use exchange::{DepositOutcome, RedeemOutcome, ReserveExchange};
pub use reserve::ReserveBook;

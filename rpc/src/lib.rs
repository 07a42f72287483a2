//! HTTP API for the coffer service.
//!
//! Provides endpoints for:
//! - Reserve exchange (deposit, redeem, vault top-up)
//! - Transfers, allowances, and delegated transfers
//! - Privileged mint / burn / rate management
//! - Account, rate, and summary views
//!
//! Amounts travel as decimal strings; the literal `"max"` is the
//! whole-balance sentinel.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ErrorResponse, RpcError, RpcResult};
pub use server::{create_router, RpcServer};

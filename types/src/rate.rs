//! Interest rate type.
//!
//! Rates are per-second linear interest in fixed-point form: a principal P
//! held for `dt` seconds at rate `r` is worth
//! `P * (RATE_SCALE + r * dt) / RATE_SCALE`. Interest is linear, never
//! compounded; nothing re-enters the principal until a ledger operation
//! materializes it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-point denominator for rate arithmetic (10^18).
pub const RATE_SCALE: u128 = 1_000_000_000_000_000_000;

/// A per-second linear interest rate in raw fixed-point units.
///
/// A raw value of `RATE_SCALE / (365 * 24 * 3600)` doubles a balance in one
/// year. Rates fit in u64 so they survive TOML config files unmangled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rate(u64);

impl Rate {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/s", self.0)
    }
}

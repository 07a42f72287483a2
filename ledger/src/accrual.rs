//! Accrual arithmetic.
//!
//! All values are deterministic integers: principals are `u128` raw units,
//! rates are `u64` raw fixed-point per second, timestamps are `u64` whole
//! seconds. Interest for a window is
//! `principal × rate × elapsed / RATE_SCALE`, truncated.
//!
//! The product `principal × rate × elapsed` can exceed `u128` for balances
//! that are otherwise perfectly representable, so the multiplication is split
//! at `RATE_SCALE`:
//!
//! `⌊p·m/S⌋ = (p/S)·m + ⌊(p mod S)·m/S⌋`  where `m = rate × elapsed`
//!
//! which is exact in integer arithmetic and only overflows for windows whose
//! interest genuinely does not fit in `u128`.

use coffer_store::Account;
use coffer_types::{Amount, Rate, Timestamp, RATE_SCALE};

/// Interest earned by `principal` at `rate` over `elapsed_secs`, truncated.
///
/// `None` means the result does not fit in `u128`.
pub fn interest_checked(principal: Amount, rate: Rate, elapsed_secs: u64) -> Option<Amount> {
    let multiplier = (rate.raw() as u128).checked_mul(elapsed_secs as u128)?;
    let whole = principal.raw() / RATE_SCALE;
    let fractional = principal.raw() % RATE_SCALE;
    let high = whole.checked_mul(multiplier)?;
    let low = fractional.checked_mul(multiplier)? / RATE_SCALE;
    high.checked_add(low).map(Amount::new)
}

/// The observed balance of an account at `now`, with checked arithmetic.
pub fn balance_at_checked(account: &Account, now: Timestamp) -> Option<Amount> {
    let elapsed = account.last_accrual.elapsed_since(now);
    let interest = interest_checked(account.principal, account.locked_rate, elapsed)?;
    account.principal.checked_add(interest)
}

/// The observed balance of an account at `now`.
///
/// Falls back to the materialized principal if the accrued interest is not
/// representable; the view degrades but never under-reports what is stored.
pub fn balance_at(account: &Account, now: Timestamp) -> Amount {
    balance_at_checked(account, now).unwrap_or(account.principal)
}

/// Fold the interest accrued up to `now` into the stored principal and
/// restart the accrual window. Returns the materialized interest.
///
/// The window start only ever moves forward: if `now` precedes
/// `last_accrual` (clock regression), no interest accrues and the window is
/// left where it was.
pub fn materialize(account: &mut Account, now: Timestamp) -> Option<Amount> {
    let balance = balance_at_checked(account, now)?;
    let interest = balance.saturating_sub(account.principal);
    account.principal = balance;
    if now > account.last_accrual {
        account.last_accrual = now;
    }
    Some(interest)
}

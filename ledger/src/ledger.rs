//! The accrual ledger state machine.

use crate::accrual;
use crate::error::LedgerError;
use coffer_store::Account;
use coffer_types::{Amount, HolderAddress, Rate, Timestamp};
use std::collections::HashMap;

/// Result of a mint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MintOutcome {
    pub minted: Amount,
    /// Interest folded into the principal before the mint landed.
    pub interest_realized: Amount,
    /// The rate the recipient is locked at from now on.
    pub locked_rate: Rate,
}

/// Result of a burn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BurnOutcome {
    /// The resolved amount (the whole-balance sentinel resolves here).
    pub burned: Amount,
    pub interest_realized: Amount,
}

/// Result of a transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferOutcome {
    /// The resolved amount (the whole-balance sentinel resolves here).
    pub amount: Amount,
    /// Whether the recipient inherited the sender's locked rate.
    pub rate_inherited: bool,
}

/// Result of an accepted rate change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateChange {
    pub previous: Rate,
    pub current: Rate,
}

/// The accrual ledger. Computes balances, materializes interest, moves
/// principal, and enforces the decrease-only global rate.
///
/// Every state-changing operation receives `now` from the caller; the ledger
/// never reads a clock. Operations are all-or-nothing: they work on copies
/// of the touched accounts and write nothing back until every check and
/// every piece of arithmetic has succeeded.
pub struct AccrualLedger {
    global_rate: Rate,
    accounts: HashMap<HolderAddress, Account>,
    /// Sum of all stored principals, maintained incrementally.
    total_principal: Amount,
}

impl AccrualLedger {
    /// Create an empty ledger with the given initial global rate.
    pub fn new(initial_rate: Rate) -> Self {
        Self {
            global_rate: initial_rate,
            accounts: HashMap::new(),
            total_principal: Amount::ZERO,
        }
    }

    /// Rebuild a ledger from persisted accounts.
    pub fn from_accounts(
        global_rate: Rate,
        accounts: HashMap<HolderAddress, Account>,
    ) -> Result<Self, LedgerError> {
        let mut total = Amount::ZERO;
        for account in accounts.values() {
            total = total
                .checked_add(account.principal)
                .ok_or(LedgerError::Overflow)?;
        }
        Ok(Self {
            global_rate,
            accounts,
            total_principal: total,
        })
    }

    // ── Views ───────────────────────────────────────────────────────────

    /// The observed balance of `holder` at `now`. Unseen holders read as zero.
    pub fn balance_of(&self, holder: &HolderAddress, now: Timestamp) -> Amount {
        self.accounts
            .get(holder)
            .map(|a| accrual::balance_at(a, now))
            .unwrap_or(Amount::ZERO)
    }

    /// The observed balance with checked arithmetic.
    pub fn balance_of_checked(
        &self,
        holder: &HolderAddress,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        match self.accounts.get(holder) {
            Some(a) => accrual::balance_at_checked(a, now).ok_or(LedgerError::Overflow),
            None => Ok(Amount::ZERO),
        }
    }

    /// The materialized principal of `holder` (excludes pending interest).
    pub fn principal_of(&self, holder: &HolderAddress) -> Amount {
        self.accounts
            .get(holder)
            .map(|a| a.principal)
            .unwrap_or(Amount::ZERO)
    }

    /// The rate `holder` is locked at, `None` if the holder was never touched.
    pub fn rate_of(&self, holder: &HolderAddress) -> Option<Rate> {
        self.accounts.get(holder).map(|a| a.locked_rate)
    }

    pub fn global_rate(&self) -> Rate {
        self.global_rate
    }

    /// Sum of all stored principals.
    pub fn total_principal(&self) -> Amount {
        self.total_principal
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// The stored record for `holder`, if any.
    pub fn account(&self, holder: &HolderAddress) -> Option<Account> {
        self.accounts.get(holder).copied()
    }

    /// Iterate all stored records (persistence, snapshots).
    pub fn accounts(&self) -> impl Iterator<Item = (&HolderAddress, &Account)> {
        self.accounts.iter()
    }

    // ── Operations ──────────────────────────────────────────────────────

    /// Mint `amount` new units to `to`.
    ///
    /// The recipient is materialized first, then re-locked at the current
    /// global rate unconditionally. An existing holder locked above today's
    /// global rate comes out locked at the lower one; their interest up to
    /// this instant was folded in at the old rate.
    pub fn mint(
        &mut self,
        to: &HolderAddress,
        amount: Amount,
        now: Timestamp,
    ) -> Result<MintOutcome, LedgerError> {
        let mut account = self.account_or_opened(to, now);
        let interest = accrual::materialize(&mut account, now).ok_or(LedgerError::Overflow)?;
        account.locked_rate = self.global_rate;
        account.principal = account
            .principal
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let total = self
            .total_principal
            .checked_add(interest)
            .and_then(|t| t.checked_add(amount))
            .ok_or(LedgerError::Overflow)?;

        self.accounts.insert(to.clone(), account);
        self.total_principal = total;
        Ok(MintOutcome {
            minted: amount,
            interest_realized: interest,
            locked_rate: account.locked_rate,
        })
    }

    /// Burn `amount` units from `from`. `Amount::MAX` burns the holder's
    /// entire freshly materialized balance.
    pub fn burn(
        &mut self,
        from: &HolderAddress,
        amount: Amount,
        now: Timestamp,
    ) -> Result<BurnOutcome, LedgerError> {
        let mut account = self.account_or_opened(from, now);
        let interest = accrual::materialize(&mut account, now).ok_or(LedgerError::Overflow)?;
        let burned = if amount.is_max() {
            account.principal
        } else {
            amount
        };
        if account.principal < burned {
            return Err(LedgerError::InsufficientBalance {
                needed: burned,
                available: account.principal,
            });
        }
        account.principal = account
            .principal
            .checked_sub(burned)
            .ok_or(LedgerError::Overflow)?;
        let total = self
            .total_principal
            .checked_add(interest)
            .and_then(|t| t.checked_sub(burned))
            .ok_or(LedgerError::Overflow)?;

        self.accounts.insert(from.clone(), account);
        self.total_principal = total;
        Ok(BurnOutcome {
            burned,
            interest_realized: interest,
        })
    }

    /// Move `amount` units from `from` to `to`. `Amount::MAX` moves the
    /// sender's entire freshly materialized balance.
    ///
    /// Both parties are materialized before anything moves. A recipient whose
    /// materialized balance is zero inherits the sender's locked rate; anyone
    /// already holding value keeps their own lock.
    pub fn transfer(
        &mut self,
        from: &HolderAddress,
        to: &HolderAddress,
        amount: Amount,
        now: Timestamp,
    ) -> Result<TransferOutcome, LedgerError> {
        if from == to {
            return self.transfer_to_self(from, amount, now);
        }

        let mut src = self.account_or_opened(from, now);
        let mut dst = self.account_or_opened(to, now);
        let src_interest = accrual::materialize(&mut src, now).ok_or(LedgerError::Overflow)?;
        let dst_interest = accrual::materialize(&mut dst, now).ok_or(LedgerError::Overflow)?;

        let moved = if amount.is_max() { src.principal } else { amount };
        if src.principal < moved {
            return Err(LedgerError::InsufficientBalance {
                needed: moved,
                available: src.principal,
            });
        }

        let rate_inherited = dst.principal.is_zero();
        if rate_inherited {
            dst.locked_rate = src.locked_rate;
        }
        src.principal = src
            .principal
            .checked_sub(moved)
            .ok_or(LedgerError::Overflow)?;
        dst.principal = dst
            .principal
            .checked_add(moved)
            .ok_or(LedgerError::Overflow)?;
        let total = self
            .total_principal
            .checked_add(src_interest)
            .and_then(|t| t.checked_add(dst_interest))
            .ok_or(LedgerError::Overflow)?;

        self.accounts.insert(from.clone(), src);
        self.accounts.insert(to.clone(), dst);
        self.total_principal = total;
        Ok(TransferOutcome {
            amount: moved,
            rate_inherited,
        })
    }

    /// A self-transfer still materializes and still checks solvency, but the
    /// rate-inheritance rule never applies to a holder already carrying the
    /// balance being moved.
    fn transfer_to_self(
        &mut self,
        holder: &HolderAddress,
        amount: Amount,
        now: Timestamp,
    ) -> Result<TransferOutcome, LedgerError> {
        let mut account = self.account_or_opened(holder, now);
        let interest = accrual::materialize(&mut account, now).ok_or(LedgerError::Overflow)?;
        let moved = if amount.is_max() {
            account.principal
        } else {
            amount
        };
        if account.principal < moved {
            return Err(LedgerError::InsufficientBalance {
                needed: moved,
                available: account.principal,
            });
        }
        let total = self
            .total_principal
            .checked_add(interest)
            .ok_or(LedgerError::Overflow)?;

        self.accounts.insert(holder.clone(), account);
        self.total_principal = total;
        Ok(TransferOutcome {
            amount: moved,
            rate_inherited: false,
        })
    }

    /// Change the global rate. Only decreases (or re-submitting the current
    /// value) are accepted; the global rate never increases over the life of
    /// the ledger. Holders keep their existing locks.
    pub fn set_rate(&mut self, new_rate: Rate) -> Result<RateChange, LedgerError> {
        if new_rate > self.global_rate {
            return Err(LedgerError::RateChangeRejected {
                current: self.global_rate,
                requested: new_rate,
            });
        }
        let previous = self.global_rate;
        self.global_rate = new_rate;
        Ok(RateChange {
            previous,
            current: new_rate,
        })
    }

    /// The stored record for `holder`, or a fresh zero account whose accrual
    /// window starts at `now`.
    fn account_or_opened(&self, holder: &HolderAddress, now: Timestamp) -> Account {
        self.accounts
            .get(holder)
            .copied()
            .unwrap_or_else(|| Account::opened(self.global_rate, now))
    }
}

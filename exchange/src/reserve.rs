//! Reserve asset bookkeeping.

use crate::error::ExchangeError;
use coffer_types::{Amount, HolderAddress};
use std::collections::HashMap;

/// Reserve asset balances per address, including the vault's.
///
/// Absent addresses read as zero. Moves are all-or-nothing: both sides are
/// computed before either is written.
#[derive(Debug, Default)]
pub struct ReserveBook {
    balances: HashMap<HolderAddress, Amount>,
}

impl ReserveBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a book from persisted balances.
    pub fn from_balances(balances: HashMap<HolderAddress, Amount>) -> Self {
        Self { balances }
    }

    pub fn balance_of(&self, address: &HolderAddress) -> Amount {
        self.balances.get(address).copied().unwrap_or(Amount::ZERO)
    }

    /// Add reserve to an address (genesis seeding, external inflows).
    pub fn credit(&mut self, address: &HolderAddress, amount: Amount) -> Result<(), ExchangeError> {
        let updated = self
            .balance_of(address)
            .checked_add(amount)
            .ok_or(ExchangeError::Overflow)?;
        self.balances.insert(address.clone(), updated);
        Ok(())
    }

    /// Move reserve between two addresses.
    pub fn transfer(
        &mut self,
        from: &HolderAddress,
        to: &HolderAddress,
        amount: Amount,
    ) -> Result<(), ExchangeError> {
        let available = self.balance_of(from);
        let debited = available
            .checked_sub(amount)
            .ok_or(ExchangeError::InsufficientReserve {
                needed: amount,
                available,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(ExchangeError::Overflow)?;
        self.balances.insert(from.clone(), debited);
        self.balances.insert(to.clone(), credited);
        Ok(())
    }

    /// Iterate all balances (persistence).
    pub fn iter(&self) -> impl Iterator<Item = (&HolderAddress, &Amount)> {
        self.balances.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> HolderAddress {
        HolderAddress::new(format!("cfr_{n:0>8}"))
    }

    #[test]
    fn absent_addresses_read_as_zero() {
        let book = ReserveBook::new();
        assert_eq!(book.balance_of(&addr(1)), Amount::ZERO);
    }

    #[test]
    fn transfer_moves_exactly() {
        let mut book = ReserveBook::new();
        book.credit(&addr(1), Amount::new(1000)).unwrap();
        book.transfer(&addr(1), &addr(2), Amount::new(300)).unwrap();
        assert_eq!(book.balance_of(&addr(1)), Amount::new(700));
        assert_eq!(book.balance_of(&addr(2)), Amount::new(300));
    }

    #[test]
    fn transfer_beyond_balance_fails_cleanly() {
        let mut book = ReserveBook::new();
        book.credit(&addr(1), Amount::new(100)).unwrap();
        let result = book.transfer(&addr(1), &addr(2), Amount::new(500));
        match result.unwrap_err() {
            ExchangeError::InsufficientReserve { needed, available } => {
                assert_eq!(needed, Amount::new(500));
                assert_eq!(available, Amount::new(100));
            }
            other => panic!("expected InsufficientReserve, got {other:?}"),
        }
        assert_eq!(book.balance_of(&addr(1)), Amount::new(100));
        assert_eq!(book.balance_of(&addr(2)), Amount::ZERO);
    }

    #[test]
    fn self_transfer_changes_nothing() {
        let mut book = ReserveBook::new();
        book.credit(&addr(1), Amount::new(100)).unwrap();
        book.transfer(&addr(1), &addr(1), Amount::new(40)).unwrap();
        assert_eq!(book.balance_of(&addr(1)), Amount::new(100));
    }
}

//! Spender allowances for delegated transfers.

use coffer_types::{Amount, HolderAddress};
use std::collections::HashMap;

/// In-memory allowance bookkeeping: how much a spender may move on an
/// owner's behalf. `Amount::MAX` is an unlimited allowance and is never
/// decremented by spending.
///
/// The table is a dumb collaborator: sufficiency is the caller's check,
/// `spend` just records the decrement. Allowances are not persisted; they
/// reset on restart.
#[derive(Debug, Default)]
pub struct AllowanceTable {
    allowances: HashMap<(HolderAddress, HolderAddress), Amount>,
}

impl AllowanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the allowance `owner` grants `spender`, replacing any previous
    /// value. Zero clears the entry.
    pub fn approve(&mut self, owner: &HolderAddress, spender: &HolderAddress, amount: Amount) {
        let key = (owner.clone(), spender.clone());
        if amount.is_zero() {
            self.allowances.remove(&key);
        } else {
            self.allowances.insert(key, amount);
        }
    }

    /// The remaining allowance, zero if none was granted.
    pub fn allowance(&self, owner: &HolderAddress, spender: &HolderAddress) -> Amount {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Record that `spender` used `amount` of their allowance. Unlimited
    /// allowances stay unlimited; bounded ones decrement, saturating at zero.
    pub fn spend(&mut self, owner: &HolderAddress, spender: &HolderAddress, amount: Amount) {
        let key = (owner.clone(), spender.clone());
        if let Some(remaining) = self.allowances.get(&key).copied() {
            if remaining.is_max() {
                return;
            }
            let updated = remaining.saturating_sub(amount);
            if updated.is_zero() {
                self.allowances.remove(&key);
            } else {
                self.allowances.insert(key, updated);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(name: &str) -> HolderAddress {
        HolderAddress::new(format!("cfr_{name}"))
    }

    #[test]
    fn default_allowance_is_zero() {
        let table = AllowanceTable::new();
        assert_eq!(table.allowance(&addr("alice"), &addr("bob")), Amount::ZERO);
    }

    #[test]
    fn approve_replaces_rather_than_accumulates() {
        let mut table = AllowanceTable::new();
        table.approve(&addr("alice"), &addr("bob"), Amount::new(500));
        table.approve(&addr("alice"), &addr("bob"), Amount::new(200));
        assert_eq!(
            table.allowance(&addr("alice"), &addr("bob")),
            Amount::new(200)
        );
    }

    #[test]
    fn spend_decrements_bounded_allowances() {
        let mut table = AllowanceTable::new();
        table.approve(&addr("alice"), &addr("bob"), Amount::new(500));
        table.spend(&addr("alice"), &addr("bob"), Amount::new(300));
        assert_eq!(
            table.allowance(&addr("alice"), &addr("bob")),
            Amount::new(200)
        );
    }

    #[test]
    fn unlimited_allowance_never_decrements() {
        let mut table = AllowanceTable::new();
        table.approve(&addr("alice"), &addr("bob"), Amount::MAX);
        table.spend(&addr("alice"), &addr("bob"), Amount::new(1_000_000));
        assert_eq!(table.allowance(&addr("alice"), &addr("bob")), Amount::MAX);
    }

    #[test]
    fn allowances_are_directional_and_per_pair() {
        let mut table = AllowanceTable::new();
        table.approve(&addr("alice"), &addr("bob"), Amount::new(100));
        assert_eq!(table.allowance(&addr("bob"), &addr("alice")), Amount::ZERO);
        assert_eq!(
            table.allowance(&addr("alice"), &addr("carol")),
            Amount::ZERO
        );
    }

    #[test]
    fn approving_zero_clears_the_entry() {
        let mut table = AllowanceTable::new();
        table.approve(&addr("alice"), &addr("bob"), Amount::new(100));
        table.approve(&addr("alice"), &addr("bob"), Amount::ZERO);
        assert_eq!(table.allowance(&addr("alice"), &addr("bob")), Amount::ZERO);
    }
}
